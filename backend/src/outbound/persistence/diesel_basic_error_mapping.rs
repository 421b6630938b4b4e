//! Shared Diesel error mapping for the booking repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::CorruptRow;
use super::pool::PoolError;

/// Constraint backing the one-allocation-per-event-and-resource rule.
pub(crate) const ALLOCATION_PAIR_CONSTRAINT: &str = "allocations_event_resource_key";
pub(crate) const USERNAME_CONSTRAINT: &str = "users_username_key";
pub(crate) const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// `NotFound` and query-builder failures map to query errors; a closed
/// connection maps to a connection error.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    log_diesel_error(&error);
    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Map a row that failed domain validation into a query error.
pub(crate) fn map_corrupt_row<E, Q>(error: CorruptRow, query: Q) -> E
where
    Q: FnOnce(String) -> E,
{
    debug!(table = error.table, id = %error.id, reason = %error.reason, "corrupt row");
    query(error.to_string())
}

/// Constraint-level classification used by writes that can race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation<'a> {
    Unique(Option<&'a str>),
    ForeignKey,
    Serialization,
}

/// Classify `error` when it is a constraint or serialization failure.
pub(crate) fn violation(error: &DieselError) -> Option<Violation<'_>> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(Violation::Unique(info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            Some(Violation::ForeignKey)
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            Some(Violation::Serialization)
        }
        _ => None,
    }
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}
