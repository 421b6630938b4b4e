//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data<HttpState>`. It holds the domain
//! services, which in turn depend only on repository ports, so the same
//! handlers run over PostgreSQL or the in-memory store.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AdminRepository, AllocationRepository, EventRepository, ResourceRepository, TokenRepository,
    UserRepository,
};
use crate::domain::{
    AccountPolicy, AccountService, AdminService, AllocationService, CatalogueService,
    UtilizationReporter,
};

/// Parameter object bundling one implementation of every repository port.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub events: Arc<dyn EventRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub allocations: Arc<dyn AllocationRepository>,
    pub admin: Arc<dyn AdminRepository>,
}

impl HttpStatePorts {
    /// Use one store for every port.
    ///
    /// # Examples
    /// ```
    /// use booking::inbound::http::state::HttpStatePorts;
    /// use booking::outbound::memory::InMemoryStore;
    ///
    /// let ports = HttpStatePorts::from_store(InMemoryStore::new());
    /// let _events = ports.events.clone();
    /// ```
    pub fn from_store<S>(store: S) -> Self
    where
        S: UserRepository
            + TokenRepository
            + EventRepository
            + ResourceRepository
            + AllocationRepository
            + AdminRepository
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            tokens: store.clone(),
            events: store.clone(),
            resources: store.clone(),
            allocations: store.clone(),
            admin: store,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub catalogue: CatalogueService,
    pub allocations: AllocationService,
    pub reports: UtilizationReporter,
    pub admin: AdminService,
}

impl HttpState {
    /// Wire every service over `ports`, sharing one clock.
    pub fn new(ports: HttpStatePorts, clock: Arc<dyn Clock>, policy: AccountPolicy) -> Self {
        let HttpStatePorts {
            users,
            tokens,
            events,
            resources,
            allocations,
            admin,
        } = ports;
        Self {
            accounts: AccountService::new(users, tokens, Arc::clone(&clock), policy),
            catalogue: CatalogueService::new(
                Arc::clone(&events),
                Arc::clone(&resources),
                Arc::clone(&allocations),
                Arc::clone(&clock),
            ),
            allocations: AllocationService::new(
                events,
                Arc::clone(&resources),
                Arc::clone(&allocations),
                Arc::clone(&clock),
            ),
            reports: UtilizationReporter::new(resources, allocations, Arc::clone(&clock)),
            admin: AdminService::new(admin, clock),
        }
    }
}
