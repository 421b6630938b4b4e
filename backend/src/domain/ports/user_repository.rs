//! Port for user account persistence.
use async_trait::async_trait;

use crate::domain::{PasswordHash, StoredCredentials, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already registered.
        DuplicateUsername => "username already taken",
        /// The email is already registered.
        DuplicateEmail => "email already registered",
    }
}

/// User account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Uniqueness violations map to the duplicate
    /// variants.
    async fn insert(&self, user: &User, password_hash: &PasswordHash)
    -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user and password hash by exact username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Whether an account already uses `email`.
    async fn email_exists(&self, email: &str) -> Result<bool, UserRepositoryError>;
}
