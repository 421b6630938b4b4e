//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api/v1` handler and the health probes, the
//! domain payloads they exchange, and two security schemes: the session
//! cookie and bearer tokens. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AdminStats, Allocation, AllocationDetails, Error, ErrorCode, EventView, OwnedEvent, Resource,
    User, UtilizationRow,
};
use crate::inbound::http::allocations::{AllocateRequest, Availability};
use crate::inbound::http::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::inbound::http::events::CreateEventRequest;
use crate::inbound::http::resources::{CreateResourceRequest, UpdateResourceRequest};

/// Enrich the generated document with the authentication schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Token returned by register or login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Booking API",
        description = "Events, resources and conflict-free resource allocation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = []), ("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::profile,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::events::register_attendee,
        crate::inbound::http::events::list_my_events,
        crate::inbound::http::resources::list_resources,
        crate::inbound::http::resources::get_resource,
        crate::inbound::http::resources::create_resource,
        crate::inbound::http::resources::update_resource,
        crate::inbound::http::resources::delete_resource,
        crate::inbound::http::allocations::list_allocations,
        crate::inbound::http::allocations::check_availability,
        crate::inbound::http::allocations::allocate,
        crate::inbound::http::allocations::remove_allocation,
        crate::inbound::http::report::utilization_report,
        crate::inbound::http::admin::stats,
        crate::inbound::http::admin::clear_all_data,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        EventView,
        OwnedEvent,
        Resource,
        Allocation,
        AllocationDetails,
        UtilizationRow,
        AdminStats,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        CreateEventRequest,
        CreateResourceRequest,
        UpdateResourceRequest,
        AllocateRequest,
        Availability,
    )),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "events", description = "Events and attendees"),
        (name = "resources", description = "Bookable resources"),
        (name = "allocations", description = "Resource bookings for events"),
        (name = "report", description = "Utilisation reporting"),
        (name = "admin", description = "Administrator operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
