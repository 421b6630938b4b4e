//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed booking entities and the use-cases that
//! operate on them. Services depend only on the repository traits in
//! [`ports`]; inbound adapters translate HTTP into validated domain values and
//! an explicit [`Actor`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Event, Resource, Allocation — the booking aggregates.
//! - AllocationService, UtilizationReporter — allocation and reporting
//!   use-cases; AccountService, CatalogueService, AdminService around them.

pub mod account_service;
pub mod admin_service;
pub mod allocation;
pub mod allocation_service;
pub mod auth;
pub mod catalogue_service;
pub mod conflict;
pub mod error;
pub mod event;
pub mod ids;
pub mod ports;
pub mod resource;
mod store_error_mapping;
pub mod trace_id;
pub mod user;
pub mod utilization;

pub use self::account_service::{AccountPolicy, AccountService, DEFAULT_TOKEN_TTL};
pub use self::admin_service::{AdminService, AdminStats};
pub use self::allocation::{Allocation, AllocationDetails, BookedInterval};
pub use self::allocation_service::AllocationService;
pub use self::auth::{
    Actor, BearerToken, IssuedToken, LoginCredentials, LoginValidationError, PasswordHash,
    PasswordHashError, Registration, StoredCredentials, TokenDigest, TokenRecord,
};
pub use self::catalogue_service::{CatalogueService, OwnedEvent};
pub use self::conflict::ConflictChecker;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::event::{
    Event, EventDraft, EventOwner, EventValidationError, EventView, TimeSpan,
};
pub use self::ids::{AllocationId, EventId, IdValidationError, ResourceId, UserId};
pub use self::resource::{Resource, ResourceDraft, ResourceUpdate, ResourceValidationError};
pub use self::store_error_mapping::RESOURCE_CONFLICT_MESSAGE;
pub use self::trace_id::TraceId;
pub use self::user::{Email, User, UserValidationError, Username};
pub use self::utilization::{ReportRange, ReportRangeError, UtilizationReporter, UtilizationRow};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use booking::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
