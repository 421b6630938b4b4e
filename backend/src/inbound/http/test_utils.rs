//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::test::TestRequest;
use actix_web::{App, web};
use mockable::Clock;
use serde_json::json;

use crate::Trace;
use crate::domain::AccountPolicy;
use crate::outbound::memory::InMemoryStore;

use super::configure_api;
use super::state::{HttpState, HttpStatePorts};

/// Username granted admin rights by [`memory_state`].
pub const TEST_ADMIN: &str = "admin";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Services over a fresh [`InMemoryStore`]; registering [`TEST_ADMIN`]
/// yields an administrator.
pub fn memory_state(clock: Arc<dyn Clock>) -> web::Data<HttpState> {
    let policy = AccountPolicy {
        bootstrap_admin: Some(TEST_ADMIN.to_owned()),
        ..AccountPolicy::default()
    };
    let ports = HttpStatePorts::from_store(InMemoryStore::new());
    web::Data::new(HttpState::new(ports, clock, policy))
}

/// `POST /api/v1/auth/register` for `username` with a valid password.
pub fn register_request(username: &str) -> TestRequest {
    TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
        "username": username,
        "email": format!("{username}@example.org"),
        "password": "correct horse",
    }))
}

/// `POST /api/v1/events` with RFC 3339 bounds.
pub fn create_event_request(title: &str, start: &str, end: &str) -> TestRequest {
    TestRequest::post().uri("/api/v1/events").set_json(json!({
        "title": title,
        "startTime": start,
        "endTime": end,
        "category": "meeting",
    }))
}

/// `POST /api/v1/resources`.
pub fn create_resource_request(name: &str, kind: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/v1/resources")
        .set_json(json!({"name": name, "type": kind}))
}

/// `POST /api/v1/allocations`.
pub fn allocate_request(event_id: &str, resource_id: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/v1/allocations")
        .set_json(json!({"eventId": event_id, "resourceId": resource_id}))
}

/// Attach `token` as a bearer credential.
pub fn with_bearer(request: TestRequest, token: &str) -> TestRequest {
    request.insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
}

/// Full `/api/v1` surface with tracing and test sessions.
pub fn api_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).wrap(Trace).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .configure(configure_api),
    )
}
