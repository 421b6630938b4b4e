//! PostgreSQL-backed `UserRepository` and `TokenRepository` adapters.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    TokenRepository, TokenRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{PasswordHash, StoredCredentials, TokenDigest, TokenRecord, User, UserId};

use super::diesel_basic_error_mapping::{
    EMAIL_CONSTRAINT, USERNAME_CONSTRAINT, Violation, map_basic_diesel_error,
    map_basic_pool_error, map_corrupt_row, violation,
};
use super::models::{NewUserRow, TokenRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{auth_tokens, users};

/// Diesel-backed account store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match violation(&error) {
        Some(Violation::Unique(Some(USERNAME_CONSTRAINT))) => {
            return UserRepositoryError::duplicate_username();
        }
        Some(Violation::Unique(Some(EMAIL_CONSTRAINT))) => {
            return UserRepositoryError::duplicate_email();
        }
        _ => {}
    }
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn decode(row: UserRow) -> Result<StoredCredentials, UserRepositoryError> {
    row.into_credentials()
        .map_err(|err| map_corrupt_row(err, UserRepositoryError::query))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            email: user.email.as_ref().map(AsRef::as_ref),
            password_hash: password_hash.as_phc(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| decode(row).map(|stored| stored.user))
            .transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}

/// Diesel-backed bearer token store.
#[derive(Clone)]
pub struct DieselTokenRepository {
    pool: DbPool,
}

impl DieselTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_token_pool_error(error: PoolError) -> TokenRepositoryError {
    map_basic_pool_error(error, TokenRepositoryError::connection)
}

fn map_token_diesel_error(error: diesel::result::Error) -> TokenRepositoryError {
    map_basic_diesel_error(
        error,
        TokenRepositoryError::query,
        TokenRepositoryError::connection,
    )
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn insert(&self, record: &TokenRecord) -> Result<(), TokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_token_pool_error)?;
        diesel::insert_into(auth_tokens::table)
            .values(TokenRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_token_diesel_error)
    }

    async fn find(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<TokenRecord>, TokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_token_pool_error)?;
        let row = auth_tokens::table
            .find(digest.as_str())
            .select(TokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_token_diesel_error)?;
        Ok(row.map(TokenRecord::from))
    }

    async fn revoke(&self, digest: &TokenDigest) -> Result<(), TokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_token_pool_error)?;
        diesel::delete(auth_tokens::table.find(digest.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_token_diesel_error)
    }
}
