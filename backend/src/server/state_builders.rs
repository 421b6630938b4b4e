//! Builders wiring repository adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::warn;

use booking::inbound::http::state::{HttpState, HttpStatePorts};
use booking::outbound::memory::InMemoryStore;
use booking::outbound::persistence::{
    DbPool, DieselAdminRepository, DieselAllocationRepository, DieselEventRepository,
    DieselResourceRepository, DieselTokenRepository, DieselUserRepository,
};

use super::ServerConfig;

fn postgres_ports(pool: &DbPool) -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        tokens: Arc::new(DieselTokenRepository::new(pool.clone())),
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        resources: Arc::new(DieselResourceRepository::new(pool.clone())),
        allocations: Arc::new(DieselAllocationRepository::new(pool.clone())),
        admin: Arc::new(DieselAdminRepository::new(pool.clone())),
    }
}

/// Build the shared HTTP state over PostgreSQL when a pool is configured,
/// otherwise over a process-local in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => postgres_ports(pool),
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            HttpStatePorts::from_store(InMemoryStore::new())
        }
    };
    web::Data::new(HttpState::new(
        ports,
        Arc::new(DefaultClock),
        config.policy.clone(),
    ))
}
