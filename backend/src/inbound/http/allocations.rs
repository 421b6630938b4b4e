//! Allocation API handlers.
//!
//! ```text
//! GET /api/v1/allocations
//! GET /api/v1/allocations/availability?eventId=..&resourceId=..
//! POST /api/v1/allocations {"eventId":"..","resourceId":".."}
//! DELETE /api/v1/allocations/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Allocation, AllocationDetails, AllocationId, Error, EventId, ResourceId};

use super::ApiResult;
use super::identity::Identity;
use super::payload::JsonOrForm;
use super::state::HttpState;
use super::validation::{FieldName, parse_id, required};

/// Body for `POST /api/v1/allocations`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    pub event_id: Option<String>,
    pub resource_id: Option<String>,
}

/// Query for `GET /api/v1/allocations/availability`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub event_id: Option<String>,
    pub resource_id: Option<String>,
}

/// Availability answer.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Availability {
    pub available: bool,
}

fn pair_from_parts(
    event_id: Option<String>,
    resource_id: Option<String>,
) -> Result<(EventId, ResourceId), Error> {
    let event_field = FieldName::new("eventId");
    let resource_field = FieldName::new("resourceId");
    let event_id = parse_id(&required(event_id, event_field)?, event_field, EventId::new)?;
    let resource_id = parse_id(
        &required(resource_id, resource_field)?,
        resource_field,
        ResourceId::new,
    )?;
    Ok((event_id, resource_id))
}

/// List allocations ordered by event start time.
#[utoipa::path(
    get,
    path = "/api/v1/allocations",
    responses(
        (status = 200, description = "Allocations", body = [AllocationDetails]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["allocations"],
    operation_id = "listAllocations"
)]
#[get("/allocations")]
pub async fn list_allocations(
    state: web::Data<HttpState>,
    _identity: Identity,
) -> ApiResult<web::Json<Vec<AllocationDetails>>> {
    Ok(web::Json(state.allocations.list().await?))
}

/// Whether a resource is free for an event's interval.
#[utoipa::path(
    get,
    path = "/api/v1/allocations/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability", body = Availability),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Event or resource not found", body = Error)
    ),
    tags = ["allocations"],
    operation_id = "checkAvailability"
)]
#[get("/allocations/availability")]
pub async fn check_availability(
    state: web::Data<HttpState>,
    _identity: Identity,
    query: web::Query<AvailabilityQuery>,
) -> ApiResult<web::Json<Availability>> {
    let AvailabilityQuery {
        event_id,
        resource_id,
    } = query.into_inner();
    let (event_id, resource_id) = pair_from_parts(event_id, resource_id)?;
    let available = state
        .allocations
        .is_available(&event_id, &resource_id)
        .await?;
    Ok(web::Json(Availability { available }))
}

/// Book a resource for an event.
#[utoipa::path(
    post,
    path = "/api/v1/allocations",
    request_body = AllocateRequest,
    responses(
        (status = 201, description = "Allocated", body = Allocation),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Event or resource not found", body = Error),
        (status = 409, description = "Resource already booked", body = Error),
        (status = 503, description = "Store busy; retry", body = Error)
    ),
    tags = ["allocations"],
    operation_id = "allocate"
)]
#[post("/allocations")]
pub async fn allocate(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: JsonOrForm<AllocateRequest>,
) -> ApiResult<HttpResponse> {
    let AllocateRequest {
        event_id,
        resource_id,
    } = payload.into_inner();
    let (event_id, resource_id) = pair_from_parts(event_id, resource_id)?;
    let allocation = state
        .allocations
        .allocate(identity.actor(), &event_id, &resource_id)
        .await?;
    Ok(HttpResponse::Created().json(allocation))
}

/// Release an allocation.
#[utoipa::path(
    delete,
    path = "/api/v1/allocations/{id}",
    params(("id" = String, Path, description = "Allocation identifier")),
    responses(
        (status = 204, description = "Allocation removed"),
        (status = 403, description = "Caller does not own the event", body = Error),
        (status = 404, description = "Allocation not found", body = Error)
    ),
    tags = ["allocations"],
    operation_id = "removeAllocation"
)]
#[delete("/allocations/{id}")]
pub async fn remove_allocation(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, FieldName::new("id"), AllocationId::new)?;
    state.allocations.remove(identity.actor(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "allocations_tests.rs"]
mod tests;
