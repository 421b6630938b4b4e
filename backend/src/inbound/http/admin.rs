//! Administrator handlers. Non-admin callers receive `403`.

use actix_web::{HttpResponse, get, post, web};

use crate::domain::{AdminStats, Error};

use super::ApiResult;
use super::identity::Identity;
use super::state::HttpState;

/// Store-wide counts.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Statistics", body = AdminStats),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Administrator access required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminStats"
)]
#[get("/admin/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<AdminStats>> {
    Ok(web::Json(state.admin.stats(identity.actor()).await?))
}

/// Delete all events, resources, allocations and attendee registrations.
#[utoipa::path(
    post,
    path = "/api/v1/admin/clear-all-data",
    responses(
        (status = 204, description = "Data cleared"),
        (status = 403, description = "Administrator access required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "clearAllData"
)]
#[post("/admin/clear-all-data")]
pub async fn clear_all_data(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<HttpResponse> {
    state.admin.clear_all_data(identity.actor()).await?;
    Ok(HttpResponse::NoContent().finish())
}
