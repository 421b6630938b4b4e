//! Resource booking backend.
//!
//! Users create events, manage shared resources and allocate resources to
//! events. An allocation is refused when the resource is already booked over
//! an overlapping interval. The crate is split hexagonally:
//!
//! - [`domain`]: entities, conflict rules and the services enforcing them.
//! - [`inbound`]: the actix-web adapter under `/api/v1`.
//! - [`outbound`]: PostgreSQL (Diesel) and in-memory repository adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
