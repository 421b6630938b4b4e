//! Allocations join one resource to one event for the event's duration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AllocationId, EventId, ResourceId, TimeSpan};

/// Persisted event-resource assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    #[schema(value_type = String)]
    pub id: AllocationId,
    #[schema(value_type = String)]
    pub event_id: EventId,
    #[schema(value_type = String)]
    pub resource_id: ResourceId,
    pub created_at: DateTime<Utc>,
}

impl Allocation {
    /// New allocation with a fresh id.
    pub fn new(event_id: EventId, resource_id: ResourceId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: AllocationId::random(),
            event_id,
            resource_id,
            created_at,
        }
    }
}

/// An allocation joined to its event's interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedInterval {
    pub allocation_id: AllocationId,
    pub event_id: EventId,
    pub resource_id: ResourceId,
    pub span: TimeSpan,
}

/// Allocation listing row with display fields from the event and resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDetails {
    #[schema(value_type = String)]
    pub id: AllocationId,
    #[schema(value_type = String)]
    pub event_id: EventId,
    pub event_title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[schema(value_type = String)]
    pub resource_id: ResourceId,
    pub resource_name: String,
}
