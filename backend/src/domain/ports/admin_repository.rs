//! Port for administrative aggregate queries and bulk deletion.
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Event;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by admin repository adapters.
    pub enum AdminRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "admin repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "admin repository query failed: {message}",
    }
}

/// Aggregate counts read in one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreStats {
    pub total_events: u64,
    pub total_users: u64,
    pub active_events: u64,
    pub total_registrations: u64,
    pub events_by_category: BTreeMap<String, u64>,
    pub recent_events: Vec<Event>,
}

/// Administrative store access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Counts as of `now`; `active_events` are those ending after `now`.
    /// `recent_events` holds up to `recent_limit` events, newest first.
    async fn stats(
        &self,
        now: DateTime<Utc>,
        recent_limit: usize,
    ) -> Result<StoreStats, AdminRepositoryError>;

    /// Delete every allocation, attendee, event and resource in one
    /// transaction. Accounts and tokens are kept.
    async fn clear_all(&self) -> Result<(), AdminRepositoryError>;
}
