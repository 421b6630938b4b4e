//! Application settings loaded via OrthoConfig.
//!
//! Values come from `BOOKING_*` environment variables, the matching CLI flags
//! or a configuration file. Session cookie settings are read separately by
//! [`crate::inbound::http::session_config`].

use std::net::{AddrParseError, SocketAddr};

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{AccountPolicy, DEFAULT_TOKEN_TTL};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Server configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKING")]
pub struct AppSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// Bearer token lifetime in hours.
    pub token_ttl_hours: Option<u32>,
    /// Username promoted to administrator when it registers.
    pub bootstrap_admin: Option<String>,
}

impl AppSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed `bind_addr`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Account policy derived from the token lifetime and bootstrap admin.
    pub fn account_policy(&self) -> AccountPolicy {
        let token_ttl = self
            .token_ttl_hours
            .filter(|hours| *hours > 0)
            .map_or(DEFAULT_TOKEN_TTL, |hours| TimeDelta::hours(i64::from(hours)));
        AccountPolicy {
            token_ttl,
            bootstrap_admin: self
                .bootstrap_admin
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
        }
    }
}
