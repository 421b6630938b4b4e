//! Event and resource catalogue use-cases.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::ports::{AllocationRepository, EventRepository, ResourceRepository};
use super::store_error_mapping::{map_allocation_error, map_event_error, map_resource_error};
use super::{
    Actor, AllocationDetails, Error, Event, EventDraft, EventId, EventOwner, EventView, Resource,
    ResourceDraft, ResourceId, ResourceUpdate,
};

/// An owned event together with the resources booked for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedEvent {
    #[serde(flatten)]
    pub event: EventView,
    pub allocations: Vec<AllocationDetails>,
}

/// Event and resource catalogue.
#[derive(Clone)]
pub struct CatalogueService {
    events: Arc<dyn EventRepository>,
    resources: Arc<dyn ResourceRepository>,
    allocations: Arc<dyn AllocationRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogueService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        resources: Arc<dyn ResourceRepository>,
        allocations: Arc<dyn AllocationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            resources,
            allocations,
            clock,
        }
    }

    /// Create an event owned by `actor`.
    pub async fn create_event(&self, actor: &Actor, draft: EventDraft) -> Result<Event, Error> {
        let event = draft.into_event(EventOwner::Owned(actor.user_id), self.clock.utc());
        self.events.insert(&event).await.map_err(map_event_error)?;
        info!(event_id = %event.id, user_id = %actor.user_id, "event created");
        Ok(event)
    }

    /// Every event ordered by start time.
    pub async fn list_events(&self) -> Result<Vec<Event>, Error> {
        self.events.list().await.map_err(map_event_error)
    }

    /// Events owned by `actor`, each with its allocations.
    pub async fn list_owned_events(&self, actor: &Actor) -> Result<Vec<OwnedEvent>, Error> {
        let events = self
            .events
            .list_by_owner(&actor.user_id)
            .await
            .map_err(map_event_error)?;
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let owned: HashSet<EventId> = events.iter().map(|event| event.id).collect();
        let mut details = self
            .allocations
            .list_details()
            .await
            .map_err(map_allocation_error)?;
        details.retain(|row| owned.contains(&row.event_id));

        Ok(events
            .iter()
            .map(|event| OwnedEvent {
                event: EventView::from(event),
                allocations: details
                    .iter()
                    .filter(|row| row.event_id == event.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    /// Register `actor` as an attendee. Registering twice is a no-op.
    pub async fn register_attendee(&self, actor: &Actor, event_id: &EventId) -> Result<(), Error> {
        let event = self
            .events
            .find_by_id(event_id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| Error::not_found("event not found"))?;
        self.events
            .add_attendee(&event.id, &actor.user_id, self.clock.utc())
            .await
            .map_err(map_event_error)?;
        info!(event_id = %event.id, user_id = %actor.user_id, "attendee registered");
        Ok(())
    }

    pub async fn create_resource(&self, draft: ResourceDraft) -> Result<Resource, Error> {
        let resource = draft.into_resource(self.clock.utc());
        self.resources
            .insert(&resource)
            .await
            .map_err(map_resource_error)?;
        info!(resource_id = %resource.id, "resource created");
        Ok(resource)
    }

    /// Apply a partial update to a resource.
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        update: ResourceUpdate,
    ) -> Result<Resource, Error> {
        let current = self.get_resource(id).await?;
        let updated = update.apply(current);
        let stored = self
            .resources
            .update(&updated)
            .await
            .map_err(map_resource_error)?;
        if !stored {
            return Err(Error::not_found("resource not found"));
        }
        Ok(updated)
    }

    /// Every resource ordered by name.
    pub async fn list_resources(&self) -> Result<Vec<Resource>, Error> {
        self.resources.list().await.map_err(map_resource_error)
    }

    pub async fn get_resource(&self, id: &ResourceId) -> Result<Resource, Error> {
        self.resources
            .find_by_id(id)
            .await
            .map_err(map_resource_error)?
            .ok_or_else(|| Error::not_found("resource not found"))
    }
}
