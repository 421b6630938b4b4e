//! Port for event persistence, including attendee registrations.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Event, EventId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "event repository query failed: {message}",
        /// Referenced event does not exist.
        MissingEvent => "event does not exist",
    }
}

/// Event storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event.
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError>;

    /// Fetch an event by identifier.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError>;

    /// All events ordered by start time.
    async fn list(&self) -> Result<Vec<Event>, EventRepositoryError>;

    /// Events owned by `owner`, ordered by start time.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Event>, EventRepositoryError>;

    /// Delete the event's allocations, its attendee rows, then the event, in
    /// one transaction. Returns `false` when the event was already gone.
    async fn delete_with_dependents(&self, id: &EventId) -> Result<bool, EventRepositoryError>;

    /// Register `user` as attending `event`. Repeat registrations are no-ops.
    async fn add_attendee(
        &self,
        event: &EventId,
        user: &UserId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), EventRepositoryError>;
}
