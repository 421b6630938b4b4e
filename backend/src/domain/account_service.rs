//! Account registration, login and identity resolution.
//!
//! Both identity strategies end in the same place: [`AccountService::resolve_session`]
//! and [`AccountService::resolve_token`] return the [`Actor`] that inbound
//! adapters pass into every other service call.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::ports::{TokenRepository, UserRepository, UserRepositoryError};
use super::store_error_mapping::{map_token_error, map_user_error};
use super::{
    Actor, BearerToken, Error, IssuedToken, LoginCredentials, PasswordHash, Registration,
    TokenRecord, User, UserId,
};

/// Default bearer token lifetime.
pub const DEFAULT_TOKEN_TTL: TimeDelta = TimeDelta::hours(24);

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account policy knobs supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPolicy {
    /// Lifetime of issued bearer tokens.
    pub token_ttl: TimeDelta,
    /// Username that becomes an administrator when it registers.
    pub bootstrap_admin: Option<String>,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            token_ttl: DEFAULT_TOKEN_TTL,
            bootstrap_admin: None,
        }
    }
}

/// Account use-cases.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    clock: Arc<dyn Clock>,
    policy: AccountPolicy,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        clock: Arc<dyn Clock>,
        policy: AccountPolicy,
    ) -> Self {
        Self {
            users,
            tokens,
            clock,
            policy,
        }
    }

    /// Create an account.
    ///
    /// Taken usernames and emails are reported as `conflict` before hashing.
    /// The store's unique constraints catch registrations that race past the
    /// check.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        let username = registration.username();
        let name: &str = username.as_ref();
        let taken = self
            .users
            .find_credentials(name)
            .await
            .map_err(map_user_error)?;
        if taken.is_some() {
            return Err(map_user_error(UserRepositoryError::duplicate_username()));
        }
        if let Some(email) = registration.email() {
            let exists = self
                .users
                .email_exists(email.as_ref())
                .await
                .map_err(map_user_error)?;
            if exists {
                return Err(map_user_error(UserRepositoryError::duplicate_email()));
            }
        }

        let hash = PasswordHash::create(registration.password())
            .map_err(|err| Error::internal(err.to_string()))?;
        let is_admin = self
            .policy
            .bootstrap_admin
            .as_deref()
            .is_some_and(|admin| admin == name);
        let user = User {
            id: UserId::random(),
            username: username.clone(),
            email: registration.email().cloned(),
            is_admin,
            created_at: self.clock.utc(),
        };
        self.users
            .insert(&user, &hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, is_admin, "account registered");
        Ok(user)
    }

    /// Check credentials. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_error)?;
        match stored {
            Some(stored) if stored.password_hash.verify(credentials.password()) => {
                info!(user_id = %stored.user.id, "login succeeded");
                Ok(stored.user)
            }
            _ => {
                debug!("login rejected");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }

    /// Issue a bearer token for `user_id`. Only the digest is stored.
    pub async fn issue_token(&self, user_id: &UserId) -> Result<IssuedToken, Error> {
        let token = BearerToken::generate();
        let issued_at = self.clock.utc();
        let record = TokenRecord {
            digest: token.digest(),
            user_id: *user_id,
            issued_at,
            expires_at: issued_at + self.policy.token_ttl,
        };
        self.tokens.insert(&record).await.map_err(map_token_error)?;
        Ok(IssuedToken {
            token,
            expires_at: record.expires_at,
        })
    }

    async fn actor_for(&self, user_id: &UserId) -> Result<Option<Actor>, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?;
        Ok(user.map(|user| Actor {
            user_id: user.id,
            is_admin: user.is_admin,
        }))
    }

    /// Identity for a user id read from the session cookie.
    pub async fn resolve_session(&self, user_id: &UserId) -> Result<Actor, Error> {
        self.actor_for(user_id).await?.ok_or_else(|| {
            warn!(user_id = %user_id, "session refers to unknown user");
            Error::unauthorized("login required")
        })
    }

    /// Identity for a presented bearer token.
    pub async fn resolve_token(&self, token: &BearerToken) -> Result<Actor, Error> {
        let record = self
            .tokens
            .find(&token.digest())
            .await
            .map_err(map_token_error)?
            .ok_or_else(|| Error::unauthorized("invalid token"))?;
        if record.expires_at <= self.clock.utc() {
            debug!(user_id = %record.user_id, "expired token presented");
            return Err(Error::unauthorized("token expired"));
        }
        self.actor_for(&record.user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("invalid token"))
    }

    /// Forget a bearer token. Unknown tokens are ignored.
    pub async fn revoke_token(&self, token: &BearerToken) -> Result<(), Error> {
        self.tokens
            .revoke(&token.digest())
            .await
            .map_err(map_token_error)
    }

    /// Public account fields of `actor`.
    pub async fn profile(&self, actor: &Actor) -> Result<User, Error> {
        self.users
            .find_by_id(&actor.user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}
