//! Port for allocation persistence.
//!
//! The write path, [`AllocationRepository::insert_if_free`], owns the
//! serialization guarantee: adapters run the overlap check and the insert
//! under one lock scoped to the resource, so two callers can never both
//! observe a free interval and commit overlapping bookings.
use async_trait::async_trait;

use crate::domain::{
    Allocation, AllocationDetails, AllocationId, BookedInterval, ResourceId, TimeSpan,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by allocation repository adapters.
    pub enum AllocationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "allocation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "allocation repository query failed: {message}",
        /// The store aborted the transaction and the caller may resubmit.
        Retry { message: String } => "allocation transaction aborted: {message}",
        /// The interval overlaps an existing booking of the resource.
        Overlap { existing: AllocationId } => "overlaps existing allocation {existing}",
        /// The event already holds the resource.
        Duplicate => "event already holds this resource",
        /// The event or resource disappeared before the insert committed.
        MissingReference => "event or resource no longer exists",
    }
}

/// Allocation storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AllocationRepository: Send + Sync {
    /// Fetch an allocation by identifier.
    async fn find_by_id(
        &self,
        id: &AllocationId,
    ) -> Result<Option<Allocation>, AllocationRepositoryError>;

    /// Every allocation of `resource` joined to its event's interval.
    async fn bookings_for_resource(
        &self,
        resource: &ResourceId,
    ) -> Result<Vec<BookedInterval>, AllocationRepositoryError>;

    /// Every allocation joined to its event's interval.
    async fn all_bookings(&self) -> Result<Vec<BookedInterval>, AllocationRepositoryError>;

    /// Every allocation with event and resource display fields, ordered by
    /// event start time.
    async fn list_details(&self) -> Result<Vec<AllocationDetails>, AllocationRepositoryError>;

    /// Insert `allocation` unless `span` overlaps an existing booking of the
    /// same resource. Check and insert run atomically per resource.
    async fn insert_if_free(
        &self,
        allocation: &Allocation,
        span: &TimeSpan,
    ) -> Result<(), AllocationRepositoryError>;

    /// Delete an allocation. Returns `false` when it was already gone.
    async fn delete(&self, id: &AllocationId) -> Result<bool, AllocationRepositoryError>;
}
