//! Interval-conflict detection for resource bookings.
//!
//! The overlap decision is a pure function over a resource's bookings so that
//! every store adapter applies exactly the same rule inside its own locked
//! write path. [`ConflictChecker`] is the read-only query form used outside a
//! write.

use std::sync::Arc;

use super::ports::{AllocationRepository, AllocationRepositoryError};
use super::{AllocationId, BookedInterval, ResourceId, TimeSpan};

/// Return the first booking in `bookings` whose interval overlaps `candidate`
/// under strict half-open semantics, skipping `exclude`.
///
/// # Examples
/// ```
/// use booking::domain::conflict::find_conflict;
/// use booking::domain::{AllocationId, BookedInterval, EventId, ResourceId, TimeSpan};
/// use chrono::{TimeZone, Utc};
///
/// let at = |h| Utc.with_ymd_and_hms(2024, 1, 10, h, 0, 0).unwrap();
/// let existing = BookedInterval {
///     allocation_id: AllocationId::random(),
///     event_id: EventId::random(),
///     resource_id: ResourceId::random(),
///     span: TimeSpan::try_new(at(9), at(10)).unwrap(),
/// };
/// let adjacent = TimeSpan::try_new(at(10), at(11)).unwrap();
/// assert!(find_conflict(&[existing], &adjacent, None).is_none());
/// ```
pub fn find_conflict<'a>(
    bookings: &'a [BookedInterval],
    candidate: &TimeSpan,
    exclude: Option<&AllocationId>,
) -> Option<&'a BookedInterval> {
    bookings
        .iter()
        .filter(|booking| exclude != Some(&booking.allocation_id))
        .find(|booking| booking.span.overlaps(candidate))
}

/// Read-only conflict query against the allocation store.
#[derive(Clone)]
pub struct ConflictChecker {
    allocations: Arc<dyn AllocationRepository>,
}

impl ConflictChecker {
    /// Create a checker over the given allocation store.
    pub fn new(allocations: Arc<dyn AllocationRepository>) -> Self {
        Self { allocations }
    }

    /// Whether `span` overlaps any booking of `resource` other than `exclude`.
    pub async fn has_conflict(
        &self,
        resource: &ResourceId,
        span: &TimeSpan,
        exclude: Option<&AllocationId>,
    ) -> Result<bool, AllocationRepositoryError> {
        let bookings = self.allocations.bookings_for_resource(resource).await?;
        Ok(find_conflict(&bookings, span, exclude).is_some())
    }
}
