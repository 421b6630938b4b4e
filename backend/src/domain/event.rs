//! Events and their booking intervals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, UserId};

/// Maximum event title length.
pub const TITLE_MAX: usize = 100;
/// Maximum event category length.
pub const CATEGORY_MAX: usize = 50;
/// Category assigned when none is supplied.
pub const DEFAULT_CATEGORY: &str = "general";

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Validation errors raised while building events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    /// Title missing or blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title too long.
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    /// Category too long.
    #[error("category must be at most {max} characters")]
    CategoryTooLong { max: usize },
    /// `end_time` is not after `start_time`.
    #[error("end time must be after start time")]
    EmptyInterval,
}

/// Half-open time interval `[start, end)` with `start < end`.
///
/// # Examples
/// ```
/// use booking::domain::TimeSpan;
/// use chrono::{TimeZone, Utc};
///
/// let at = |h| Utc.with_ymd_and_hms(2024, 1, 10, h, 0, 0).unwrap();
/// let morning = TimeSpan::try_new(at(9), at(10)).unwrap();
/// let late_morning = TimeSpan::try_new(at(10), at(11)).unwrap();
/// assert!(!morning.overlaps(&late_morning));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSpan {
    /// Build a span, rejecting zero-length and inverted intervals.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, EventValidationError> {
        if end <= start {
            return Err(EventValidationError::EmptyInterval);
        }
        Ok(Self { start, end })
    }

    /// Inclusive start instant.
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end instant.
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Calendar date of the start instant (UTC).
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Whole seconds covered by the span.
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Fractional hours covered by the span.
    pub fn duration_hours(&self) -> f64 {
        seconds_to_hours(self.duration_seconds())
    }

    /// Strict half-open overlap: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

pub(crate) fn seconds_to_hours(seconds: i64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR
}

/// Who may perform owner-only actions on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOwner {
    /// Only this user may delete the event or remove its allocations.
    Owned(UserId),
    /// No owner was recorded; any authenticated user may act on it.
    Unowned,
}

impl EventOwner {
    /// Whether `user` passes the ownership rule.
    pub fn permits(&self, user: &UserId) -> bool {
        match self {
            Self::Owned(owner) => owner == user,
            Self::Unowned => true,
        }
    }

    /// Owner id, if any.
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Owned(owner) => Some(owner),
            Self::Unowned => None,
        }
    }
}

/// A scheduled event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub span: TimeSpan,
    pub description: String,
    pub category: String,
    pub owner: EventOwner,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    title: String,
    span: TimeSpan,
    description: String,
    category: String,
}

impl EventDraft {
    /// Validate raw event fields.
    pub fn try_new(
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        description: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, EventValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(EventValidationError::TitleTooLong { max: TITLE_MAX });
        }
        let category = category
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        if category.chars().count() > CATEGORY_MAX {
            return Err(EventValidationError::CategoryTooLong { max: CATEGORY_MAX });
        }
        let span = TimeSpan::try_new(start, end)?;
        Ok(Self {
            title: title.to_owned(),
            span,
            description: description.unwrap_or_default().trim().to_owned(),
            category: category.to_owned(),
        })
    }

    /// Materialise the event owned by `owner`.
    pub fn into_event(self, owner: EventOwner, created_at: DateTime<Utc>) -> Event {
        Event {
            id: EventId::random(),
            title: self.title,
            span: self.span,
            description: self.description,
            category: self.category,
            owner,
            created_at,
        }
    }
}

/// Public representation of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[schema(value_type = String)]
    pub id: EventId,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: String,
    pub category: String,
    #[schema(value_type = Option<String>)]
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            start_time: event.span.start(),
            end_time: event.span.end(),
            description: event.description.clone(),
            category: event.category.clone(),
            owner_id: event.owner.user_id().copied(),
            created_at: event.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, hour, minute, 0)
            .single()
            .expect("valid fixture time")
    }

    fn span(start: (u32, u32), end: (u32, u32)) -> TimeSpan {
        TimeSpan::try_new(at(start.0, start.1), at(end.0, end.1)).expect("valid span")
    }

    #[rstest]
    #[case((9, 0), (10, 0), (10, 0), (11, 0), false)]
    #[case((9, 0), (10, 30), (10, 0), (11, 0), true)]
    #[case((9, 0), (12, 0), (10, 0), (11, 0), true)]
    #[case((10, 0), (11, 0), (9, 0), (10, 0), false)]
    #[case((9, 0), (10, 0), (9, 0), (10, 0), true)]
    fn overlap_is_strict_half_open(
        #[case] a_start: (u32, u32),
        #[case] a_end: (u32, u32),
        #[case] b_start: (u32, u32),
        #[case] b_end: (u32, u32),
        #[case] expected: bool,
    ) {
        let a = span(a_start, a_end);
        let b = span(b_start, b_end);
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[rstest]
    #[case((10, 0), (10, 0))]
    #[case((11, 0), (10, 0))]
    fn rejects_empty_and_inverted_spans(#[case] start: (u32, u32), #[case] end: (u32, u32)) {
        let result = TimeSpan::try_new(at(start.0, start.1), at(end.0, end.1));
        assert_eq!(result, Err(EventValidationError::EmptyInterval));
    }

    #[rstest]
    fn duration_is_fractional_hours() {
        assert!((span((9, 0), (10, 30)).duration_hours() - 1.5).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case("   ", None, EventValidationError::EmptyTitle)]
    #[case(&"x".repeat(TITLE_MAX + 1), None, EventValidationError::TitleTooLong { max: TITLE_MAX })]
    #[case(
        "Standup",
        Some("c".repeat(CATEGORY_MAX + 1)),
        EventValidationError::CategoryTooLong { max: CATEGORY_MAX }
    )]
    fn draft_rejects_invalid_fields(
        #[case] title: &str,
        #[case] category: Option<String>,
        #[case] expected: EventValidationError,
    ) {
        let result = EventDraft::try_new(title, at(9, 0), at(10, 0), None, category.as_deref());
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn draft_defaults_category_and_description() {
        let draft = EventDraft::try_new(" Standup ", at(9, 0), at(10, 0), None, Some(" "))
            .expect("valid draft");
        let owner = UserId::random();
        let event = draft.into_event(EventOwner::Owned(owner), at(8, 0));
        assert_eq!(event.title, "Standup");
        assert_eq!(event.category, DEFAULT_CATEGORY);
        assert!(event.description.is_empty());
        assert!(event.owner.permits(&owner));
        assert!(!event.owner.permits(&UserId::random()));
    }

    #[rstest]
    fn unowned_events_permit_everyone() {
        assert!(EventOwner::Unowned.permits(&UserId::random()));
    }
}
