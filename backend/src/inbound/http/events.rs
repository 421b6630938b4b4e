//! Event API handlers.
//!
//! ```text
//! GET /api/v1/events
//! POST /api/v1/events {"title":"Standup","startTime":"2024-01-10T09:00:00Z","endTime":"2024-01-10T10:00:00Z"}
//! DELETE /api/v1/events/{id}
//! POST /api/v1/events/{id}/attendees
//! GET /api/v1/users/me/events
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, EventDraft, EventId, EventView, OwnedEvent};

use super::ApiResult;
use super::identity::Identity;
use super::payload::JsonOrForm;
use super::state::HttpState;
use super::validation::{
    FieldName, map_event_validation_error, parse_id, parse_timestamp, required,
};

/// Body for `POST /api/v1/events`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[schema(example = "Standup")]
    pub title: Option<String>,
    /// ISO-8601 timestamp; values without an offset are read as UTC.
    #[schema(example = "2024-01-10T09:00:00Z")]
    pub start_time: Option<String>,
    #[schema(example = "2024-01-10T10:00:00Z")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(example = "meeting")]
    pub category: Option<String>,
}

impl TryFrom<CreateEventRequest> for EventDraft {
    type Error = Error;

    fn try_from(value: CreateEventRequest) -> Result<Self, Self::Error> {
        let title = required(value.title, FieldName::new("title"))?;
        let start_field = FieldName::new("startTime");
        let end_field = FieldName::new("endTime");
        let start = parse_timestamp(&required(value.start_time, start_field)?, start_field)?;
        let end = parse_timestamp(&required(value.end_time, end_field)?, end_field)?;
        EventDraft::try_new(
            &title,
            start,
            end,
            value.description.as_deref(),
            value.category.as_deref(),
        )
        .map_err(map_event_validation_error)
    }
}

pub(crate) fn event_id_from_path(raw: &str) -> Result<EventId, Error> {
    parse_id(raw, FieldName::new("id"), EventId::new)
}

/// List every event, earliest first.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    responses(
        (status = 200, description = "Events", body = [EventView]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["events"],
    operation_id = "listEvents"
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    _identity: Identity,
) -> ApiResult<web::Json<Vec<EventView>>> {
    let events = state.catalogue.list_events().await?;
    Ok(web::Json(events.iter().map(EventView::from).collect()))
}

/// Create an event owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: JsonOrForm<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    let draft = EventDraft::try_from(payload.into_inner())?;
    let event = state.catalogue.create_event(identity.actor(), draft).await?;
    Ok(HttpResponse::Created().json(EventView::from(&event)))
}

/// Delete an event together with its allocations and attendees.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event identifier")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Caller does not own the event", body = Error),
        (status = 404, description = "Event not found", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let event_id = event_id_from_path(&path)?;
    state
        .allocations
        .delete_event(identity.actor(), &event_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the caller as an attendee. Repeat registrations are no-ops.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/attendees",
    params(("id" = String, Path, description = "Event identifier")),
    responses(
        (status = 204, description = "Registered"),
        (status = 404, description = "Event not found", body = Error)
    ),
    tags = ["events"],
    operation_id = "registerAttendee"
)]
#[post("/events/{id}/attendees")]
pub async fn register_attendee(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let event_id = event_id_from_path(&path)?;
    state
        .catalogue
        .register_attendee(identity.actor(), &event_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Events owned by the caller with the resources booked for each.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/events",
    responses(
        (status = 200, description = "Owned events", body = [OwnedEvent]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["events"],
    operation_id = "listMyEvents"
)]
#[get("/users/me/events")]
pub async fn list_my_events(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<Vec<OwnedEvent>>> {
    let events = state.catalogue.list_owned_events(identity.actor()).await?;
    Ok(web::Json(events))
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
