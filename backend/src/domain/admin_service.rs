//! Administrator-only statistics and bulk data reset.

use std::collections::BTreeMap;
use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::ports::AdminRepository;
use super::store_error_mapping::map_admin_error;
use super::{Actor, Error, EventView};

/// Number of newest events included in [`AdminStats::recent_events`].
pub const RECENT_EVENTS: usize = 5;

/// Store-wide counts for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_events: u64,
    pub total_users: u64,
    /// Events that have not ended yet.
    pub active_events: u64,
    /// Attendee registrations across all events.
    pub total_registrations: u64,
    pub events_by_category: BTreeMap<String, u64>,
    /// Most recently created events, newest first.
    pub recent_events: Vec<EventView>,
}

/// Administrative use-cases. Every call requires an admin [`Actor`].
#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn AdminRepository>,
    clock: Arc<dyn Clock>,
}

impl AdminService {
    pub fn new(store: Arc<dyn AdminRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn require_admin(actor: &Actor) -> Result<(), Error> {
        if actor.is_admin {
            return Ok(());
        }
        warn!(user_id = %actor.user_id, "admin operation refused");
        Err(Error::forbidden("administrator access required"))
    }

    pub async fn stats(&self, actor: &Actor) -> Result<AdminStats, Error> {
        Self::require_admin(actor)?;
        let stats = self
            .store
            .stats(self.clock.utc(), RECENT_EVENTS)
            .await
            .map_err(map_admin_error)?;
        Ok(AdminStats {
            total_events: stats.total_events,
            total_users: stats.total_users,
            active_events: stats.active_events,
            total_registrations: stats.total_registrations,
            events_by_category: stats.events_by_category,
            recent_events: stats.recent_events.iter().map(EventView::from).collect(),
        })
    }

    /// Delete every allocation, attendee, event and resource. Accounts are
    /// kept.
    pub async fn clear_all_data(&self, actor: &Actor) -> Result<(), Error> {
        Self::require_admin(actor)?;
        self.store.clear_all().await.map_err(map_admin_error)?;
        info!(user_id = %actor.user_id, "all booking data cleared");
        Ok(())
    }
}
