//! HTTP inbound adapter exposing the booking REST endpoints under `/api/v1`.

pub mod admin;
pub mod allocations;
pub mod auth;
pub mod error;
pub mod events;
pub mod health;
pub mod identity;
pub mod payload;
pub mod report;
pub mod resources;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler and the extractor error handlers on
/// `cfg`. The caller mounts the scope and wraps it in the session middleware.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use booking::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::FormConfig::default().error_handler(error::form_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::profile)
        .service(events::list_events)
        .service(events::create_event)
        .service(events::delete_event)
        .service(events::register_attendee)
        .service(events::list_my_events)
        .service(resources::list_resources)
        .service(resources::create_resource)
        .service(resources::get_resource)
        .service(resources::update_resource)
        .service(resources::delete_resource)
        .service(allocations::list_allocations)
        .service(allocations::check_availability)
        .service(allocations::allocate)
        .service(allocations::remove_allocation)
        .service(report::utilization_report)
        .service(admin::stats)
        .service(admin::clear_all_data);
}
