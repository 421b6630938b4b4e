//! Port for bearer token persistence.
use async_trait::async_trait;

use crate::domain::{TokenDigest, TokenRecord};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by token repository adapters.
    pub enum TokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

/// Storage for issued bearer token digests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Record a newly issued token.
    async fn insert(&self, record: &TokenRecord) -> Result<(), TokenRepositoryError>;

    /// Look up a token by digest.
    async fn find(&self, digest: &TokenDigest) -> Result<Option<TokenRecord>, TokenRepositoryError>;

    /// Forget a token. Unknown digests are ignored.
    async fn revoke(&self, digest: &TokenDigest) -> Result<(), TokenRepositoryError>;
}
