//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live next to
//! the rows so every repository decodes the same way.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Allocation, AllocationId, Email, Event, EventId, EventOwner, PasswordHash, Resource,
    ResourceId, StoredCredentials, TimeSpan, TokenDigest, TokenRecord, User, UserId, Username,
};

use super::schema::{allocations, auth_tokens, event_attendees, events, resources, users};

/// A stored row that no longer satisfies domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt {table} row {id}: {reason}")]
pub(crate) struct CorruptRow {
    pub table: &'static str,
    pub id: Uuid,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_credentials(self) -> Result<StoredCredentials, CorruptRow> {
        let corrupt = |reason: String| CorruptRow {
            table: "users",
            id: self.id,
            reason,
        };
        let username =
            Username::new(self.username.as_str()).map_err(|err| corrupt(err.to_string()))?;
        let email = self
            .email
            .as_deref()
            .map(Email::new)
            .transpose()
            .map_err(|err| corrupt(err.to_string()))?;
        Ok(StoredCredentials {
            user: User {
                id: UserId::from_uuid(self.id),
                username,
                email,
                is_admin: self.is_admin,
                created_at: self.created_at,
            },
            password_hash: PasswordHash::from_phc(self.password_hash),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = auth_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TokenRow {
    pub digest: String,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&TokenRecord> for TokenRow {
    fn from(record: &TokenRecord) -> Self {
        Self {
            digest: record.digest.as_str().to_owned(),
            user_id: *record.user_id.as_uuid(),
            issued_at: record.issued_at,
            expires_at: record.expires_at,
        }
    }
}

impl From<TokenRow> for TokenRecord {
    fn from(row: TokenRow) -> Self {
        Self {
            digest: TokenDigest::from_hex(row.digest),
            user_id: UserId::from_uuid(row.user_id),
            issued_at: row.issued_at,
            expires_at: row.expires_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: String,
    pub category: String,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: *event.id.as_uuid(),
            title: event.title.clone(),
            start_time: event.span.start(),
            end_time: event.span.end(),
            description: event.description.clone(),
            category: event.category.clone(),
            owner_id: event.owner.user_id().map(|owner| *owner.as_uuid()),
            created_at: event.created_at,
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = CorruptRow;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let span = TimeSpan::try_new(row.start_time, row.end_time).map_err(|err| CorruptRow {
            table: "events",
            id: row.id,
            reason: err.to_string(),
        })?;
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            span,
            description: row.description,
            category: row.category,
            owner: row
                .owner_id
                .map_or(EventOwner::Unowned, |owner| EventOwner::Owned(UserId::from_uuid(owner))),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = event_attendees)]
pub(crate) struct NewAttendeeRow {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResourceRow {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Resource> for ResourceRow {
    fn from(resource: &Resource) -> Self {
        Self {
            id: *resource.id.as_uuid(),
            name: resource.name.clone(),
            kind: resource.kind.clone(),
            created_at: resource.created_at,
        }
    }
}

impl From<ResourceRow> for Resource {
    fn from(row: ResourceRow) -> Self {
        Self {
            id: ResourceId::from_uuid(row.id),
            name: row.name,
            kind: row.kind,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = resources)]
pub(crate) struct ResourceChanges<'a> {
    pub name: &'a str,
    pub kind: &'a str,
}

// ---------------------------------------------------------------------------
// Allocations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = allocations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AllocationRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub resource_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Allocation> for AllocationRow {
    fn from(allocation: &Allocation) -> Self {
        Self {
            id: *allocation.id.as_uuid(),
            event_id: *allocation.event_id.as_uuid(),
            resource_id: *allocation.resource_id.as_uuid(),
            created_at: allocation.created_at,
        }
    }
}

impl From<AllocationRow> for Allocation {
    fn from(row: AllocationRow) -> Self {
        Self {
            id: AllocationId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            resource_id: ResourceId::from_uuid(row.resource_id),
            created_at: row.created_at,
        }
    }
}
