//! Translation of repository errors into the domain [`Error`] payload.
//!
//! Connection failures and retryable aborts become `service_unavailable`;
//! query failures become `internal_error` and are redacted at the edge.

use serde_json::json;

use super::Error;
use super::ports::{
    AdminRepositoryError, AllocationRepositoryError, EventRepositoryError,
    ResourceRepositoryError, TokenRepositoryError, UserRepositoryError,
};

/// Message returned when an allocation overlaps an existing booking.
pub const RESOURCE_CONFLICT_MESSAGE: &str = "resource already booked for overlapping time";

fn unavailable(store: &str, message: &str) -> Error {
    Error::service_unavailable(format!("{store} repository unavailable: {message}"))
}

fn internal(store: &str, message: &str) -> Error {
    Error::internal(format!("{store} repository error: {message}"))
}

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => unavailable("user", &message),
        UserRepositoryError::Query { message } => internal("user", &message),
        UserRepositoryError::DuplicateUsername => Error::conflict("username already taken")
            .with_details(json!({ "field": "username", "code": "duplicate_username" })),
        UserRepositoryError::DuplicateEmail => Error::conflict("email already registered")
            .with_details(json!({ "field": "email", "code": "duplicate_email" })),
    }
}

pub(crate) fn map_token_error(error: TokenRepositoryError) -> Error {
    match error {
        TokenRepositoryError::Connection { message } => unavailable("token", &message),
        TokenRepositoryError::Query { message } => internal("token", &message),
    }
}

pub(crate) fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => unavailable("event", &message),
        EventRepositoryError::Query { message } => internal("event", &message),
        EventRepositoryError::MissingEvent => Error::not_found("event not found"),
    }
}

pub(crate) fn map_resource_error(error: ResourceRepositoryError) -> Error {
    match error {
        ResourceRepositoryError::Connection { message } => unavailable("resource", &message),
        ResourceRepositoryError::Query { message } => internal("resource", &message),
    }
}

pub(crate) fn map_allocation_error(error: AllocationRepositoryError) -> Error {
    match error {
        AllocationRepositoryError::Connection { message } => unavailable("allocation", &message),
        AllocationRepositoryError::Query { message } => internal("allocation", &message),
        AllocationRepositoryError::Retry { message } => {
            Error::service_unavailable(format!("allocation not committed, retry: {message}"))
                .with_details(json!({ "code": "retry" }))
        }
        AllocationRepositoryError::Overlap { existing } => {
            Error::conflict(RESOURCE_CONFLICT_MESSAGE).with_details(json!({
                "code": "resource_conflict",
                "conflictingAllocationId": existing.to_string(),
            }))
        }
        AllocationRepositoryError::Duplicate => {
            Error::conflict("event already holds this resource")
                .with_details(json!({ "code": "duplicate_allocation" }))
        }
        AllocationRepositoryError::MissingReference => {
            Error::not_found("event or resource no longer exists")
        }
    }
}

pub(crate) fn map_admin_error(error: AdminRepositoryError) -> Error {
    match error {
        AdminRepositoryError::Connection { message } => unavailable("admin", &message),
        AdminRepositoryError::Query { message } => internal("admin", &message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AllocationId, ErrorCode};
    use rstest::rstest;

    #[rstest]
    #[case(AllocationRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(AllocationRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(AllocationRepositoryError::retry("40001"), ErrorCode::ServiceUnavailable)]
    #[case(AllocationRepositoryError::duplicate(), ErrorCode::Conflict)]
    #[case(AllocationRepositoryError::missing_reference(), ErrorCode::NotFound)]
    fn allocation_errors_map_to_codes(
        #[case] error: AllocationRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_allocation_error(error).code(), expected);
    }

    #[rstest]
    fn overlap_uses_the_booking_conflict_message() {
        let err = map_allocation_error(AllocationRepositoryError::overlap(AllocationId::random()));
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), RESOURCE_CONFLICT_MESSAGE);
        assert_eq!(
            err.details().and_then(|d| d.get("code")),
            Some(&json!("resource_conflict"))
        );
    }

    #[rstest]
    #[case(UserRepositoryError::duplicate_username(), "duplicate_username")]
    #[case(UserRepositoryError::duplicate_email(), "duplicate_email")]
    fn duplicate_accounts_carry_detail_codes(
        #[case] error: UserRepositoryError,
        #[case] code: &str,
    ) {
        let err = map_user_error(error);
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.details().and_then(|d| d.get("code")), Some(&json!(code)));
    }
}
