//! In-process store implementing every repository port.
//!
//! Used by tests and by the server when no database URL is configured. All
//! tables sit behind one async mutex, so each port call, including the
//! allocation check-and-insert, observes and mutates a consistent snapshot.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::domain::conflict::find_conflict;
use crate::domain::ports::{
    AdminRepository, AdminRepositoryError, AllocationRepository, AllocationRepositoryError,
    EventRepository, EventRepositoryError, ResourceRepository, ResourceRepositoryError,
    StoreStats, TokenRepository, TokenRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Allocation, AllocationDetails, AllocationId, BookedInterval, Event, EventId, PasswordHash,
    Resource, ResourceId, StoredCredentials, TimeSpan, TokenDigest, TokenRecord, User, UserId,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, StoredCredentials>,
    tokens: HashMap<TokenDigest, TokenRecord>,
    events: HashMap<EventId, Event>,
    resources: HashMap<ResourceId, Resource>,
    allocations: HashMap<AllocationId, Allocation>,
    attendees: BTreeSet<(EventId, UserId)>,
}

impl Tables {
    fn booking(&self, allocation: &Allocation) -> Option<BookedInterval> {
        self.events
            .get(&allocation.event_id)
            .map(|event| BookedInterval {
                allocation_id: allocation.id,
                event_id: allocation.event_id,
                resource_id: allocation.resource_id,
                span: event.span,
            })
    }

    fn bookings<'a>(
        &'a self,
        resource: Option<&'a ResourceId>,
    ) -> impl Iterator<Item = BookedInterval> + 'a {
        self.allocations
            .values()
            .filter(move |allocation| resource.is_none_or(|id| allocation.resource_id == *id))
            .filter_map(|allocation| self.booking(allocation))
    }

    fn events_sorted(&self, mut keep: impl FnMut(&Event) -> bool) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.values().filter(|e| keep(e)).cloned().collect();
        events.sort_by(|a, b| a.span.start().cmp(&b.span.start()).then(a.id.cmp(&b.id)));
        events
    }
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock().await;
        let clashes = |existing: &StoredCredentials| -> Option<UserRepositoryError> {
            if existing.user.username == user.username {
                return Some(UserRepositoryError::duplicate_username());
            }
            match (&existing.user.email, &user.email) {
                (Some(a), Some(b)) if a == b => Some(UserRepositoryError::duplicate_email()),
                _ => None,
            }
        };
        if let Some(error) = tables.users.values().find_map(clashes) {
            return Err(error);
        }
        tables.users.insert(
            user.id,
            StoredCredentials {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock().await.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let tables = self.lock().await;
        Ok(tables
            .users
            .values()
            .find(|stored| AsRef::<str>::as_ref(&stored.user.username) == username)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserRepositoryError> {
        let tables = self.lock().await;
        Ok(tables.users.values().any(|stored| {
            stored
                .user
                .email
                .as_ref()
                .is_some_and(|existing| AsRef::<str>::as_ref(existing) == email)
        }))
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn insert(&self, record: &TokenRecord) -> Result<(), TokenRepositoryError> {
        self.lock()
            .await
            .tokens
            .insert(record.digest.clone(), record.clone());
        Ok(())
    }

    async fn find(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<TokenRecord>, TokenRepositoryError> {
        Ok(self.lock().await.tokens.get(digest).cloned())
    }

    async fn revoke(&self, digest: &TokenDigest) -> Result<(), TokenRepositoryError> {
        self.lock().await.tokens.remove(digest);
        Ok(())
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError> {
        self.lock().await.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError> {
        Ok(self.lock().await.events.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Event>, EventRepositoryError> {
        Ok(self.lock().await.events_sorted(|_| true))
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Event>, EventRepositoryError> {
        Ok(self
            .lock()
            .await
            .events_sorted(|event| event.owner.user_id() == Some(owner)))
    }

    async fn delete_with_dependents(&self, id: &EventId) -> Result<bool, EventRepositoryError> {
        let mut tables = self.lock().await;
        if tables.events.remove(id).is_none() {
            return Ok(false);
        }
        tables.allocations.retain(|_, allocation| allocation.event_id != *id);
        tables.attendees.retain(|(event, _)| event != id);
        debug!(event_id = %id, "event and dependents removed");
        Ok(true)
    }

    async fn add_attendee(
        &self,
        event: &EventId,
        user: &UserId,
        _registered_at: DateTime<Utc>,
    ) -> Result<(), EventRepositoryError> {
        let mut tables = self.lock().await;
        if !tables.events.contains_key(event) {
            return Err(EventRepositoryError::missing_event());
        }
        tables.attendees.insert((*event, *user));
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository for InMemoryStore {
    async fn insert(&self, resource: &Resource) -> Result<(), ResourceRepositoryError> {
        self.lock()
            .await
            .resources
            .insert(resource.id, resource.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourceRepositoryError> {
        Ok(self.lock().await.resources.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Resource>, ResourceRepositoryError> {
        let tables = self.lock().await;
        let mut resources: Vec<Resource> = tables.resources.values().cloned().collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(resources)
    }

    async fn update(&self, resource: &Resource) -> Result<bool, ResourceRepositoryError> {
        let mut tables = self.lock().await;
        match tables.resources.get_mut(&resource.id) {
            Some(stored) => {
                stored.name.clone_from(&resource.name);
                stored.kind.clone_from(&resource.kind);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_with_allocations(
        &self,
        id: &ResourceId,
    ) -> Result<bool, ResourceRepositoryError> {
        let mut tables = self.lock().await;
        if tables.resources.remove(id).is_none() {
            return Ok(false);
        }
        tables
            .allocations
            .retain(|_, allocation| allocation.resource_id != *id);
        debug!(resource_id = %id, "resource and allocations removed");
        Ok(true)
    }
}

#[async_trait]
impl AllocationRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &AllocationId,
    ) -> Result<Option<Allocation>, AllocationRepositoryError> {
        Ok(self.lock().await.allocations.get(id).copied())
    }

    async fn bookings_for_resource(
        &self,
        resource: &ResourceId,
    ) -> Result<Vec<BookedInterval>, AllocationRepositoryError> {
        Ok(self.lock().await.bookings(Some(resource)).collect())
    }

    async fn all_bookings(&self) -> Result<Vec<BookedInterval>, AllocationRepositoryError> {
        Ok(self.lock().await.bookings(None).collect())
    }

    async fn list_details(&self) -> Result<Vec<AllocationDetails>, AllocationRepositoryError> {
        let tables = self.lock().await;
        let mut rows: Vec<AllocationDetails> = tables
            .allocations
            .values()
            .filter_map(|allocation| {
                let event = tables.events.get(&allocation.event_id)?;
                let resource = tables.resources.get(&allocation.resource_id)?;
                Some(AllocationDetails {
                    id: allocation.id,
                    event_id: event.id,
                    event_title: event.title.clone(),
                    start_time: event.span.start(),
                    end_time: event.span.end(),
                    resource_id: resource.id,
                    resource_name: resource.name.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn insert_if_free(
        &self,
        allocation: &Allocation,
        span: &TimeSpan,
    ) -> Result<(), AllocationRepositoryError> {
        let mut tables = self.lock().await;
        if !tables.events.contains_key(&allocation.event_id)
            || !tables.resources.contains_key(&allocation.resource_id)
        {
            return Err(AllocationRepositoryError::missing_reference());
        }
        let duplicate = tables.allocations.values().any(|existing| {
            existing.event_id == allocation.event_id
                && existing.resource_id == allocation.resource_id
        });
        if duplicate {
            return Err(AllocationRepositoryError::duplicate());
        }
        let bookings: Vec<BookedInterval> =
            tables.bookings(Some(&allocation.resource_id)).collect();
        if let Some(existing) = find_conflict(&bookings, span, None) {
            return Err(AllocationRepositoryError::overlap(existing.allocation_id));
        }
        tables.allocations.insert(allocation.id, *allocation);
        Ok(())
    }

    async fn delete(&self, id: &AllocationId) -> Result<bool, AllocationRepositoryError> {
        Ok(self.lock().await.allocations.remove(id).is_some())
    }
}

#[async_trait]
impl AdminRepository for InMemoryStore {
    async fn stats(
        &self,
        now: DateTime<Utc>,
        recent_limit: usize,
    ) -> Result<StoreStats, AdminRepositoryError> {
        let tables = self.lock().await;
        let mut events_by_category = BTreeMap::new();
        for event in tables.events.values() {
            *events_by_category.entry(event.category.clone()).or_insert(0) += 1;
        }
        let mut recent: Vec<Event> = tables.events.values().cloned().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        recent.truncate(recent_limit);

        Ok(StoreStats {
            total_events: tables.events.len() as u64,
            total_users: tables.users.len() as u64,
            active_events: tables
                .events
                .values()
                .filter(|event| event.span.end() > now)
                .count() as u64,
            total_registrations: tables.attendees.len() as u64,
            events_by_category,
            recent_events: recent,
        })
    }

    async fn clear_all(&self) -> Result<(), AdminRepositoryError> {
        let mut tables = self.lock().await;
        tables.allocations.clear();
        tables.attendees.clear();
        tables.events.clear();
        tables.resources.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
