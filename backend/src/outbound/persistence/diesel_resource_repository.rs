//! PostgreSQL-backed `ResourceRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{ResourceRepository, ResourceRepositoryError};
use crate::domain::{Resource, ResourceId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ResourceChanges, ResourceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{allocations, resources};

/// Diesel-backed resource store.
#[derive(Clone)]
pub struct DieselResourceRepository {
    pool: DbPool,
}

impl DieselResourceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ResourceRepositoryError {
    map_basic_pool_error(error, ResourceRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ResourceRepositoryError {
    map_basic_diesel_error(
        error,
        ResourceRepositoryError::query,
        ResourceRepositoryError::connection,
    )
}

#[async_trait]
impl ResourceRepository for DieselResourceRepository {
    async fn insert(&self, resource: &Resource) -> Result<(), ResourceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(resources::table)
            .values(ResourceRow::from(resource))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = resources::table
            .find(id.as_uuid())
            .select(ResourceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Resource::from))
    }

    async fn list(&self) -> Result<Vec<Resource>, ResourceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = resources::table
            .order((resources::name.asc(), resources::id.asc()))
            .select(ResourceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Resource::from).collect())
    }

    async fn update(&self, resource: &Resource) -> Result<bool, ResourceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ResourceChanges {
            name: &resource.name,
            kind: &resource.kind,
        };
        let updated = diesel::update(resources::table.find(resource.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_with_allocations(
        &self,
        id: &ResourceId,
    ) -> Result<bool, ResourceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let resource_id = *id.as_uuid();
        let (released, deleted) = conn
            .transaction(|conn| {
                async move {
                    let released = diesel::delete(
                        allocations::table.filter(allocations::resource_id.eq(resource_id)),
                    )
                    .execute(conn)
                    .await?;
                    let deleted = diesel::delete(resources::table.find(resource_id))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((released, deleted))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        debug!(resource_id = %id, released, deleted, "resource delete committed");
        Ok(deleted > 0)
    }
}
