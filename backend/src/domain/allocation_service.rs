//! Allocation orchestration: booking resources to events, removing
//! bookings, and the cascading event/resource deletes.
//!
//! Every operation takes the request's [`Actor`] explicitly. Ownership rules
//! are decided by matching on [`EventOwner`](super::EventOwner); multi-step
//! writes are delegated to repository methods that run as one transaction.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use super::conflict::ConflictChecker;
use super::ports::{
    AllocationRepository, AllocationRepositoryError, EventRepository, ResourceRepository,
};
use super::store_error_mapping::{map_allocation_error, map_event_error, map_resource_error};
use super::{
    Actor, Allocation, AllocationDetails, AllocationId, Error, Event, EventId, Resource,
    ResourceId,
};

/// Allocation use-cases.
#[derive(Clone)]
pub struct AllocationService {
    events: Arc<dyn EventRepository>,
    resources: Arc<dyn ResourceRepository>,
    allocations: Arc<dyn AllocationRepository>,
    conflicts: ConflictChecker,
    clock: Arc<dyn Clock>,
}

impl AllocationService {
    /// Create a service over the given stores.
    pub fn new(
        events: Arc<dyn EventRepository>,
        resources: Arc<dyn ResourceRepository>,
        allocations: Arc<dyn AllocationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let conflicts = ConflictChecker::new(Arc::clone(&allocations));
        Self {
            events,
            resources,
            allocations,
            conflicts,
            clock,
        }
    }

    async fn load_event(&self, id: &EventId) -> Result<Event, Error> {
        self.events
            .find_by_id(id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| Error::not_found("event not found"))
    }

    async fn load_resource(&self, id: &ResourceId) -> Result<Resource, Error> {
        self.resources
            .find_by_id(id)
            .await
            .map_err(map_resource_error)?
            .ok_or_else(|| Error::not_found("resource not found"))
    }

    /// Book `resource_id` for the duration of `event_id`.
    ///
    /// Fails with `not_found` when either entity is missing and with
    /// `conflict` when the resource is already booked over an overlapping
    /// interval or the event already holds it. Nothing is written on failure.
    pub async fn allocate(
        &self,
        actor: &Actor,
        event_id: &EventId,
        resource_id: &ResourceId,
    ) -> Result<Allocation, Error> {
        let event = self.load_event(event_id).await?;
        let resource = self.load_resource(resource_id).await?;
        let allocation = Allocation::new(event.id, resource.id, self.clock.utc());

        match self.allocations.insert_if_free(&allocation, &event.span).await {
            Ok(()) => {
                info!(
                    allocation_id = %allocation.id,
                    event_id = %event.id,
                    resource_id = %resource.id,
                    user_id = %actor.user_id,
                    "resource allocated"
                );
                Ok(allocation)
            }
            Err(error) => {
                if let AllocationRepositoryError::Overlap { existing } = &error {
                    info!(
                        event_id = %event.id,
                        resource_id = %resource.id,
                        conflicting_allocation_id = %existing,
                        "allocation rejected: overlapping booking"
                    );
                }
                Err(map_allocation_error(error))
            }
        }
    }

    /// Whether `resource_id` is free for the whole interval of `event_id`.
    ///
    /// Advisory only; [`AllocationService::allocate`] re-checks under the
    /// resource lock.
    pub async fn is_available(
        &self,
        event_id: &EventId,
        resource_id: &ResourceId,
    ) -> Result<bool, Error> {
        let event = self.load_event(event_id).await?;
        let resource = self.load_resource(resource_id).await?;
        let conflict = self
            .conflicts
            .has_conflict(&resource.id, &event.span, None)
            .await
            .map_err(map_allocation_error)?;
        Ok(!conflict)
    }

    /// Remove an allocation. Owned events only allow their owner.
    pub async fn remove(&self, actor: &Actor, allocation_id: &AllocationId) -> Result<(), Error> {
        let allocation = self
            .allocations
            .find_by_id(allocation_id)
            .await
            .map_err(map_allocation_error)?
            .ok_or_else(|| Error::not_found("allocation not found"))?;
        let event = self.load_event(&allocation.event_id).await?;
        if !event.owner.permits(&actor.user_id) {
            debug!(allocation_id = %allocation.id, user_id = %actor.user_id, "remove refused");
            return Err(Error::forbidden(
                "only the event owner may remove its allocations",
            ));
        }

        let deleted = self
            .allocations
            .delete(&allocation.id)
            .await
            .map_err(map_allocation_error)?;
        if !deleted {
            return Err(Error::not_found("allocation not found"));
        }
        info!(allocation_id = %allocation.id, user_id = %actor.user_id, "allocation removed");
        Ok(())
    }

    /// Delete an event together with its allocations and attendee rows.
    pub async fn delete_event(&self, actor: &Actor, event_id: &EventId) -> Result<(), Error> {
        let event = self.load_event(event_id).await?;
        if !event.owner.permits(&actor.user_id) {
            debug!(event_id = %event.id, user_id = %actor.user_id, "event delete refused");
            return Err(Error::forbidden("only the event owner may delete this event"));
        }

        let deleted = self
            .events
            .delete_with_dependents(&event.id)
            .await
            .map_err(map_event_error)?;
        if !deleted {
            return Err(Error::not_found("event not found"));
        }
        info!(event_id = %event.id, user_id = %actor.user_id, "event deleted");
        Ok(())
    }

    /// Delete a resource together with its allocations.
    pub async fn delete_resource(
        &self,
        actor: &Actor,
        resource_id: &ResourceId,
    ) -> Result<(), Error> {
        let deleted = self
            .resources
            .delete_with_allocations(resource_id)
            .await
            .map_err(map_resource_error)?;
        if !deleted {
            return Err(Error::not_found("resource not found"));
        }
        info!(resource_id = %resource_id, user_id = %actor.user_id, "resource deleted");
        Ok(())
    }

    /// Every allocation with event and resource display fields.
    pub async fn list(&self) -> Result<Vec<AllocationDetails>, Error> {
        self.allocations
            .list_details()
            .await
            .map_err(map_allocation_error)
    }
}

#[cfg(test)]
#[path = "allocation_service_tests.rs"]
mod tests;
