//! Utilisation report handler.

use actix_web::{get, web};
use serde::Deserialize;

use crate::domain::{Error, ReportRange, UtilizationRow};

use super::ApiResult;
use super::identity::Identity;
use super::state::HttpState;
use super::validation::{FieldName, map_report_range_error, parse_date, required};

/// Inclusive calendar range for the report.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// First day, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

impl TryFrom<ReportQuery> for ReportRange {
    type Error = Error;

    fn try_from(value: ReportQuery) -> Result<Self, Self::Error> {
        let start_field = FieldName::new("start_date");
        let end_field = FieldName::new("end_date");
        let start = parse_date(&required(value.start_date, start_field)?, start_field)?;
        let end = parse_date(&required(value.end_date, end_field)?, end_field)?;
        ReportRange::try_new(start, end).map_err(map_report_range_error)
    }
}

/// Booked hours and counts per resource.
#[utoipa::path(
    get,
    path = "/api/v1/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Utilisation rows", body = [UtilizationRow]),
        (status = 400, description = "Invalid range", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["report"],
    operation_id = "utilizationReport"
)]
#[get("/report")]
pub async fn utilization_report(
    state: web::Data<HttpState>,
    _identity: Identity,
    query: web::Query<ReportQuery>,
) -> ApiResult<web::Json<Vec<UtilizationRow>>> {
    let range = ReportRange::try_from(query.into_inner())?;
    Ok(web::Json(state.reports.report(&range).await?))
}
