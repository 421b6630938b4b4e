//! PostgreSQL-backed `AdminRepository` adapter.
//!
//! Statistics are read inside one repeatable-read, read-only transaction so
//! every count describes the same snapshot.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::info;

use crate::domain::Event;
use crate::domain::ports::{AdminRepository, AdminRepositoryError, StoreStats};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_corrupt_row,
};
use super::models::EventRow;
use super::pool::{DbPool, PoolError};
use super::schema::{allocations, event_attendees, events, resources, users};

/// Diesel-backed administrative queries.
#[derive(Clone)]
pub struct DieselAdminRepository {
    pool: DbPool,
}

impl DieselAdminRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdminRepositoryError {
    map_basic_pool_error(error, AdminRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AdminRepositoryError {
    map_basic_diesel_error(
        error,
        AdminRepositoryError::query,
        AdminRepositoryError::connection,
    )
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

struct RawStats {
    total_events: i64,
    total_users: i64,
    active_events: i64,
    total_registrations: i64,
    categories: Vec<(String, i64)>,
    recent: Vec<EventRow>,
}

#[async_trait]
impl AdminRepository for DieselAdminRepository {
    async fn stats(
        &self,
        now: DateTime<Utc>,
        recent_limit: usize,
    ) -> Result<StoreStats, AdminRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::try_from(recent_limit).unwrap_or(i64::MAX);
        let raw = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let total_events = events::table.count().get_result(conn).await?;
                    let total_users = users::table.count().get_result(conn).await?;
                    let active_events = events::table
                        .filter(events::end_time.gt(now))
                        .count()
                        .get_result(conn)
                        .await?;
                    let total_registrations =
                        event_attendees::table.count().get_result(conn).await?;
                    let categories = events::table
                        .group_by(events::category)
                        .select((events::category, count_star()))
                        .load::<(String, i64)>(conn)
                        .await?;
                    let recent = events::table
                        .order((events::created_at.desc(), events::id.asc()))
                        .limit(limit)
                        .select(EventRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(RawStats {
                        total_events,
                        total_users,
                        active_events,
                        total_registrations,
                        categories,
                        recent,
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let recent_events = raw
            .recent
            .into_iter()
            .map(|row| {
                Event::try_from(row)
                    .map_err(|err| map_corrupt_row(err, AdminRepositoryError::query))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let events_by_category: BTreeMap<String, u64> = raw
            .categories
            .into_iter()
            .map(|(category, count)| (category, to_count(count)))
            .collect();

        Ok(StoreStats {
            total_events: to_count(raw.total_events),
            total_users: to_count(raw.total_users),
            active_events: to_count(raw.active_events),
            total_registrations: to_count(raw.total_registrations),
            events_by_category,
            recent_events,
        })
    }

    async fn clear_all(&self) -> Result<(), AdminRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (allocations, events, resources) = conn
            .transaction(|conn| {
                async move {
                    let allocations = diesel::delete(allocations::table).execute(conn).await?;
                    diesel::delete(event_attendees::table).execute(conn).await?;
                    let events = diesel::delete(events::table).execute(conn).await?;
                    let resources = diesel::delete(resources::table).execute(conn).await?;
                    Ok::<_, diesel::result::Error>((allocations, events, resources))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        info!(allocations, events, resources, "booking data cleared");
        Ok(())
    }
}
