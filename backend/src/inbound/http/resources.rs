//! Resource API handlers. Resources carry no owner; any signed-in user may
//! manage them.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Resource, ResourceDraft, ResourceId, ResourceUpdate};

use super::ApiResult;
use super::identity::Identity;
use super::payload::JsonOrForm;
use super::state::HttpState;
use super::validation::{FieldName, map_resource_validation_error, parse_id, required};

/// Body for `POST /api/v1/resources`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateResourceRequest {
    #[schema(example = "Room 1")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "room")]
    pub kind: Option<String>,
}

/// Body for `PUT /api/v1/resources/{id}`. Absent fields stay unchanged.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateResourceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

fn resource_id_from_path(raw: &str) -> Result<ResourceId, Error> {
    parse_id(raw, FieldName::new("id"), ResourceId::new)
}

/// List resources by name.
#[utoipa::path(
    get,
    path = "/api/v1/resources",
    responses(
        (status = 200, description = "Resources", body = [Resource]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["resources"],
    operation_id = "listResources"
)]
#[get("/resources")]
pub async fn list_resources(
    state: web::Data<HttpState>,
    _identity: Identity,
) -> ApiResult<web::Json<Vec<Resource>>> {
    Ok(web::Json(state.catalogue.list_resources().await?))
}

/// Fetch one resource.
#[utoipa::path(
    get,
    path = "/api/v1/resources/{id}",
    params(("id" = String, Path, description = "Resource identifier")),
    responses(
        (status = 200, description = "Resource", body = Resource),
        (status = 404, description = "Resource not found", body = Error)
    ),
    tags = ["resources"],
    operation_id = "getResource"
)]
#[get("/resources/{id}")]
pub async fn get_resource(
    state: web::Data<HttpState>,
    _identity: Identity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Resource>> {
    let id = resource_id_from_path(&path)?;
    Ok(web::Json(state.catalogue.get_resource(&id).await?))
}

/// Create a resource.
#[utoipa::path(
    post,
    path = "/api/v1/resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Resource created", body = Resource),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["resources"],
    operation_id = "createResource"
)]
#[post("/resources")]
pub async fn create_resource(
    state: web::Data<HttpState>,
    _identity: Identity,
    payload: JsonOrForm<CreateResourceRequest>,
) -> ApiResult<HttpResponse> {
    let CreateResourceRequest { name, kind } = payload.into_inner();
    let draft = ResourceDraft::try_new(
        &required(name, FieldName::new("name"))?,
        &required(kind, FieldName::new("type"))?,
    )
    .map_err(map_resource_validation_error)?;
    let resource = state.catalogue.create_resource(draft).await?;
    Ok(HttpResponse::Created().json(resource))
}

/// Rename or retype a resource.
#[utoipa::path(
    put,
    path = "/api/v1/resources/{id}",
    params(("id" = String, Path, description = "Resource identifier")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Resource not found", body = Error)
    ),
    tags = ["resources"],
    operation_id = "updateResource"
)]
#[put("/resources/{id}")]
pub async fn update_resource(
    state: web::Data<HttpState>,
    _identity: Identity,
    path: web::Path<String>,
    payload: JsonOrForm<UpdateResourceRequest>,
) -> ApiResult<web::Json<Resource>> {
    let id = resource_id_from_path(&path)?;
    let UpdateResourceRequest { name, kind } = payload.into_inner();
    let update = ResourceUpdate::try_new(name.as_deref(), kind.as_deref())
        .map_err(map_resource_validation_error)?;
    Ok(web::Json(state.catalogue.update_resource(&id, update).await?))
}

/// Delete a resource and release every allocation of it.
#[utoipa::path(
    delete,
    path = "/api/v1/resources/{id}",
    params(("id" = String, Path, description = "Resource identifier")),
    responses(
        (status = 204, description = "Resource deleted"),
        (status = 404, description = "Resource not found", body = Error)
    ),
    tags = ["resources"],
    operation_id = "deleteResource"
)]
#[delete("/resources/{id}")]
pub async fn delete_resource(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = resource_id_from_path(&path)?;
    state
        .allocations
        .delete_resource(identity.actor(), &id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::auth::AuthResponse;
    use crate::inbound::http::test_utils::{
        api_app, create_resource_request, memory_state, register_request, with_bearer,
    };
    use crate::test_support::MutableClock;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn resources_support_crud_by_any_user() {
        let app = test::init_service(api_app(memory_state(
            MutableClock::at(2024, 1, 10, 8).shared(),
        )))
        .await;
        let ada: AuthResponse =
            test::call_and_read_body_json(&app, register_request("ada").to_request()).await;
        let bob: AuthResponse =
            test::call_and_read_body_json(&app, register_request("bob").to_request()).await;

        let res = test::call_service(
            &app,
            with_bearer(create_resource_request("Room 1", "room"), &ada.token).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let room: Resource = test::read_body_json(res).await;
        let uri = format!("/api/v1/resources/{}", room.id);

        let updated: Resource = test::call_and_read_body_json(
            &app,
            with_bearer(test::TestRequest::put().uri(&uri), &bob.token)
                .set_json(json!({"name": "Room 2"}))
                .to_request(),
        )
        .await;
        assert_eq!(updated.name, "Room 2");
        assert_eq!(updated.kind, "room");

        let fetched: Value = test::call_and_read_body_json(
            &app,
            with_bearer(test::TestRequest::get().uri(&uri), &ada.token).to_request(),
        )
        .await;
        assert_eq!(fetched["type"], "room");

        let deleted = test::call_service(
            &app,
            with_bearer(test::TestRequest::delete().uri(&uri), &bob.token).to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = test::call_service(
            &app,
            with_bearer(test::TestRequest::get().uri(&uri), &ada.token).to_request(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn form_bodies_create_and_update_resources() {
        let app = test::init_service(api_app(memory_state(
            MutableClock::at(2024, 1, 10, 8).shared(),
        )))
        .await;
        let ada: AuthResponse =
            test::call_and_read_body_json(&app, register_request("ada").to_request()).await;

        let res = test::call_service(
            &app,
            with_bearer(test::TestRequest::post().uri("/api/v1/resources"), &ada.token)
                .set_form([("name", "Projector"), ("type", "equipment")])
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let projector: Resource = test::read_body_json(res).await;
        assert_eq!(projector.kind, "equipment");

        let renamed: Resource = test::call_and_read_body_json(
            &app,
            with_bearer(
                test::TestRequest::put().uri(&format!("/api/v1/resources/{}", projector.id)),
                &ada.token,
            )
            .set_form([("name", "Beamer")])
            .to_request(),
        )
        .await;
        assert_eq!(renamed.name, "Beamer");
        assert_eq!(renamed.kind, "equipment");
    }

    #[actix_web::test]
    async fn empty_updates_are_rejected() {
        let app = test::init_service(api_app(memory_state(
            MutableClock::at(2024, 1, 10, 8).shared(),
        )))
        .await;
        let ada: AuthResponse =
            test::call_and_read_body_json(&app, register_request("ada").to_request()).await;
        let room: Resource = test::call_and_read_body_json(
            &app,
            with_bearer(create_resource_request("Room 1", "room"), &ada.token).to_request(),
        )
        .await;

        let res = test::call_service(
            &app,
            with_bearer(
                test::TestRequest::put().uri(&format!("/api/v1/resources/{}", room.id)),
                &ada.token,
            )
            .set_json(json!({}))
            .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn resources_require_a_name() {
        let app = test::init_service(api_app(memory_state(
            MutableClock::at(2024, 1, 10, 8).shared(),
        )))
        .await;
        let ada: AuthResponse =
            test::call_and_read_body_json(&app, register_request("ada").to_request()).await;

        let res = test::call_service(
            &app,
            with_bearer(create_resource_request("   ", "room"), &ada.token).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "name");
    }
}
