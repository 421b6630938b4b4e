//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite, time::Duration};
use booking::domain::AccountPolicy;
use booking::inbound::http::session_config::SessionSettings;
use booking::outbound::persistence::DbPool;

/// Everything `create_server` needs besides the health state.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: Duration,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) policy: AccountPolicy,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Configuration running on the in-memory store.
    #[must_use]
    pub fn new(session: SessionSettings, policy: AccountPolicy, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
            ttl,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl: ttl,
            bind_addr,
            policy,
            db_pool: None,
        }
    }

    /// Use PostgreSQL for every repository port.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
