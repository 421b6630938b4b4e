//! Per-resource utilization over a date range.
//!
//! Every resource gets a row, including resources with no bookings. Hours
//! are summed in whole seconds and rounded to two decimals only when the row
//! is produced.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::event::seconds_to_hours;
use super::ports::{AllocationRepository, ResourceRepository};
use super::store_error_mapping::{map_allocation_error, map_resource_error};
use super::{BookedInterval, Error, Resource, ResourceId};

/// Validation errors raised while building a report range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportRangeError {
    #[error("start date must not be after end date")]
    Inverted,
}

/// Inclusive calendar date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportRange {
    /// Build a range, rejecting `start > end`. A single day is valid.
    pub fn try_new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportRangeError> {
        if start > end {
            return Err(ReportRangeError::Inverted);
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the range, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One report line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationRow {
    #[schema(value_type = String)]
    pub resource_id: ResourceId,
    #[schema(example = "Room 1")]
    pub resource_name: String,
    #[schema(example = "room")]
    pub resource_type: String,
    /// Booked hours inside the range, rounded to two decimals.
    #[schema(example = 2.0)]
    pub total_hours: f64,
    /// Bookings starting inside the range.
    pub booking_count: u64,
    /// Bookings starting after today, whatever the range.
    pub upcoming_count: u64,
}

#[derive(Default)]
struct Tally {
    seconds: i64,
    bookings: u64,
    upcoming: u64,
}

fn round_hours(seconds: i64) -> f64 {
    (seconds_to_hours(seconds) * 100.0).round() / 100.0
}

/// Fold `bookings` into one row per resource, ordered by name then id.
///
/// Bookings whose resource is not in `resources` are ignored.
pub fn aggregate(
    resources: &[Resource],
    bookings: &[BookedInterval],
    range: &ReportRange,
    today: NaiveDate,
) -> Vec<UtilizationRow> {
    let mut tallies: HashMap<ResourceId, Tally> = resources
        .iter()
        .map(|resource| (resource.id, Tally::default()))
        .collect();

    for booking in bookings {
        let Some(tally) = tallies.get_mut(&booking.resource_id) else {
            continue;
        };
        let start_date = booking.span.start_date();
        if range.contains(start_date) {
            tally.seconds += booking.span.duration_seconds();
            tally.bookings += 1;
        }
        if start_date > today {
            tally.upcoming += 1;
        }
    }

    let mut ordered: Vec<&Resource> = resources.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    ordered
        .into_iter()
        .map(|resource| {
            let tally = tallies.remove(&resource.id).unwrap_or_default();
            UtilizationRow {
                resource_id: resource.id,
                resource_name: resource.name.clone(),
                resource_type: resource.kind.clone(),
                total_hours: round_hours(tally.seconds),
                booking_count: tally.bookings,
                upcoming_count: tally.upcoming,
            }
        })
        .collect()
}

/// Read-only utilization reports.
#[derive(Clone)]
pub struct UtilizationReporter {
    resources: Arc<dyn ResourceRepository>,
    allocations: Arc<dyn AllocationRepository>,
    clock: Arc<dyn Clock>,
}

impl UtilizationReporter {
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        allocations: Arc<dyn AllocationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resources,
            allocations,
            clock,
        }
    }

    /// Report every resource over `range`. "Today" is the clock's UTC date.
    pub async fn report(&self, range: &ReportRange) -> Result<Vec<UtilizationRow>, Error> {
        let resources = self.resources.list().await.map_err(map_resource_error)?;
        let bookings = self
            .allocations
            .all_bookings()
            .await
            .map_err(map_allocation_error)?;
        let today = self.clock.utc().date_naive();
        debug!(
            start = %range.start(),
            end = %range.end(),
            %today,
            resources = resources.len(),
            bookings = bookings.len(),
            "building utilization report"
        );
        Ok(aggregate(&resources, &bookings, range, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAllocationRepository, MockResourceRepository};
    use crate::domain::{AllocationId, EventId, ResourceDraft, TimeSpan};
    use crate::test_support::{MutableClock, utc};
    use rstest::{fixture, rstest};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
    }

    fn range(start: NaiveDate, end: NaiveDate) -> ReportRange {
        ReportRange::try_new(start, end).expect("valid range")
    }

    fn resource(name: &str) -> Resource {
        ResourceDraft::try_new(name, "room")
            .expect("valid resource")
            .into_resource(utc(2024, 1, 1, 0, 0))
    }

    fn booking(resource: &Resource, span: TimeSpan) -> BookedInterval {
        BookedInterval {
            allocation_id: AllocationId::random(),
            event_id: EventId::random(),
            resource_id: resource.id,
            span,
        }
    }

    #[fixture]
    fn room_one() -> Resource {
        resource("Room 1")
    }

    #[rstest]
    fn inverted_range_is_rejected() {
        assert_eq!(
            ReportRange::try_new(date(2024, 2, 1), date(2024, 1, 1)),
            Err(ReportRangeError::Inverted)
        );
    }

    #[rstest]
    fn single_day_range_is_inclusive() {
        let day = range(date(2024, 1, 10), date(2024, 1, 10));
        assert!(day.contains(date(2024, 1, 10)));
        assert!(!day.contains(date(2024, 1, 11)));
    }

    #[rstest]
    #[case(date(2024, 1, 1), date(2024, 1, 31), 2.0, 1)]
    #[case(date(2025, 1, 1), date(2025, 1, 31), 0.0, 0)]
    fn room_one_scenario(
        room_one: Resource,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
        #[case] hours: f64,
        #[case] count: u64,
    ) {
        let span = TimeSpan::try_new(utc(2024, 1, 10, 9, 0), utc(2024, 1, 10, 11, 0))
            .expect("valid span");
        let bookings = [booking(&room_one, span)];

        let rows = aggregate(
            std::slice::from_ref(&room_one),
            &bookings,
            &range(start, end),
            date(2024, 6, 1),
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.resource_name, "Room 1");
        assert_eq!(row.resource_type, "room");
        assert!((row.total_hours - hours).abs() < f64::EPSILON);
        assert_eq!(row.booking_count, count);
        assert_eq!(row.upcoming_count, 0);
    }

    #[rstest]
    fn upcoming_ignores_the_range(room_one: Resource) {
        let span = TimeSpan::try_new(utc(2024, 3, 1, 9, 0), utc(2024, 3, 1, 10, 0))
            .expect("valid span");
        let bookings = [booking(&room_one, span)];

        let rows = aggregate(
            std::slice::from_ref(&room_one),
            &bookings,
            &range(date(2024, 1, 1), date(2024, 1, 31)),
            date(2024, 2, 1),
        );

        assert_eq!(rows[0].booking_count, 0);
        assert_eq!(rows[0].upcoming_count, 1);
    }

    #[rstest]
    fn event_starting_today_is_not_upcoming(room_one: Resource) {
        let span = TimeSpan::try_new(utc(2024, 2, 1, 9, 0), utc(2024, 2, 1, 10, 0))
            .expect("valid span");
        let rows = aggregate(
            std::slice::from_ref(&room_one),
            &[booking(&room_one, span)],
            &range(date(2024, 2, 1), date(2024, 2, 1)),
            date(2024, 2, 1),
        );

        assert_eq!(rows[0].booking_count, 1);
        assert_eq!(rows[0].upcoming_count, 0);
    }

    #[rstest]
    fn hours_are_rounded_once_at_output(room_one: Resource) {
        // Three 20-minute bookings sum to exactly one hour.
        let bookings: Vec<_> = [9, 10, 11]
            .into_iter()
            .map(|hour| {
                let span = TimeSpan::try_new(utc(2024, 1, 10, hour, 0), utc(2024, 1, 10, hour, 20))
                    .expect("valid span");
                booking(&room_one, span)
            })
            .collect();

        let rows = aggregate(
            std::slice::from_ref(&room_one),
            &bookings,
            &range(date(2024, 1, 1), date(2024, 1, 31)),
            date(2024, 6, 1),
        );

        assert!((rows[0].total_hours - 1.0).abs() < f64::EPSILON);
        assert_eq!(rows[0].booking_count, 3);
    }

    #[rstest]
    fn every_resource_gets_a_row_ordered_by_name() {
        let resources = [resource("Projector"), resource("Auditorium"), resource("Room 1")];
        let rows = aggregate(
            &resources,
            &[],
            &range(date(2024, 1, 1), date(2024, 1, 31)),
            date(2024, 6, 1),
        );

        let names: Vec<_> = rows.iter().map(|row| row.resource_name.as_str()).collect();
        assert_eq!(names, ["Auditorium", "Projector", "Room 1"]);
        assert!(rows.iter().all(|row| row.booking_count == 0 && row.total_hours == 0.0));
    }

    #[rstest]
    #[tokio::test]
    async fn report_is_idempotent(room_one: Resource) {
        let span = TimeSpan::try_new(utc(2024, 1, 10, 9, 0), utc(2024, 1, 10, 11, 0))
            .expect("valid span");
        let stored = booking(&room_one, span);
        let listed = room_one.clone();

        let mut resources = MockResourceRepository::new();
        resources
            .expect_list()
            .times(2)
            .returning(move || Ok(vec![listed.clone()]));
        let mut allocations = MockAllocationRepository::new();
        allocations
            .expect_all_bookings()
            .times(2)
            .returning(move || Ok(vec![stored]));
        let reporter = UtilizationReporter::new(
            Arc::new(resources),
            Arc::new(allocations),
            MutableClock::at(2024, 1, 5, 12).shared(),
        );
        let january = range(date(2024, 1, 1), date(2024, 1, 31));

        let first = reporter.report(&january).await.expect("first report");
        let second = reporter.report(&january).await.expect("second report");

        assert_eq!(first, second);
        assert_eq!(first[0].upcoming_count, 1);
    }
}
