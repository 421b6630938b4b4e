//! PostgreSQL-backed `AllocationRepository` adapter.
//!
//! `insert_if_free` runs at `READ COMMITTED` isolation and first takes a
//! transaction-scoped advisory lock keyed on the resource. Allocators for the
//! same resource queue behind each other. Each later statement reads a fresh
//! snapshot, so the overlap check issued after the lock is granted sees the
//! booking committed by the previous holder and reports a conflict.
//! Serialization failures map to [`AllocationRepositoryError::Retry`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::conflict::find_conflict;
use crate::domain::ports::{AllocationRepository, AllocationRepositoryError};
use crate::domain::{
    Allocation, AllocationDetails, AllocationId, BookedInterval, EventId, ResourceId, TimeSpan,
};

use super::diesel_basic_error_mapping::{
    ALLOCATION_PAIR_CONSTRAINT, Violation, map_basic_diesel_error, map_basic_pool_error,
    violation,
};
use super::models::AllocationRow;
use super::pool::{DbPool, PoolError};
use super::schema::{allocations, events, resources};

const RESOURCE_LOCK_PREFIX: &str = "booking:resource:";

type BookingTuple = (Uuid, Uuid, Uuid, DateTime<Utc>, DateTime<Utc>);
type DetailsTuple = (Uuid, Uuid, String, DateTime<Utc>, DateTime<Utc>, Uuid, String);

/// Diesel-backed allocation store.
#[derive(Clone)]
pub struct DieselAllocationRepository {
    pool: DbPool,
}

impl DieselAllocationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AllocationRepositoryError {
    map_basic_pool_error(error, AllocationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AllocationRepositoryError {
    match violation(&error) {
        Some(Violation::Unique(Some(ALLOCATION_PAIR_CONSTRAINT))) => {
            return AllocationRepositoryError::duplicate();
        }
        Some(Violation::ForeignKey) => return AllocationRepositoryError::missing_reference(),
        Some(Violation::Serialization) => {
            debug!("allocation transaction hit a serialization failure");
            return AllocationRepositoryError::retry("could not serialize access");
        }
        _ => {}
    }
    map_basic_diesel_error(
        error,
        AllocationRepositoryError::query,
        AllocationRepositoryError::connection,
    )
}

fn to_booking(
    (allocation_id, event_id, resource_id, start, end): BookingTuple,
) -> Result<BookedInterval, AllocationRepositoryError> {
    let span = TimeSpan::try_new(start, end).map_err(|err| {
        AllocationRepositoryError::query(format!("corrupt events row {event_id}: {err}"))
    })?;
    Ok(BookedInterval {
        allocation_id: AllocationId::from_uuid(allocation_id),
        event_id: EventId::from_uuid(event_id),
        resource_id: ResourceId::from_uuid(resource_id),
        span,
    })
}

fn booking_columns() -> (
    allocations::id,
    allocations::event_id,
    allocations::resource_id,
    events::start_time,
    events::end_time,
) {
    (
        allocations::id,
        allocations::event_id,
        allocations::resource_id,
        events::start_time,
        events::end_time,
    )
}

async fn load_bookings(
    conn: &mut AsyncPgConnection,
    resource: Option<Uuid>,
) -> Result<Vec<BookingTuple>, diesel::result::Error> {
    let mut query = allocations::table
        .inner_join(events::table)
        .select(booking_columns())
        .into_boxed();
    if let Some(resource) = resource {
        query = query.filter(allocations::resource_id.eq(resource));
    }
    query.load::<BookingTuple>(conn).await
}

/// Failure inside the allocation write transaction.
enum InsertFailure {
    Database(diesel::result::Error),
    Rejected(AllocationRepositoryError),
}

impl From<diesel::result::Error> for InsertFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

async fn insert_locked(
    conn: &mut AsyncPgConnection,
    row: &AllocationRow,
    span: &TimeSpan,
) -> Result<(), InsertFailure> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind::<Text, _>(format!("{RESOURCE_LOCK_PREFIX}{}", row.resource_id))
        .execute(conn)
        .await?;

    let duplicate: bool = diesel::select(diesel::dsl::exists(
        allocations::table
            .filter(allocations::event_id.eq(row.event_id))
            .filter(allocations::resource_id.eq(row.resource_id)),
    ))
    .get_result(conn)
    .await?;
    if duplicate {
        return Err(InsertFailure::Rejected(AllocationRepositoryError::duplicate()));
    }

    let bookings = load_bookings(conn, Some(row.resource_id))
        .await?
        .into_iter()
        .map(to_booking)
        .collect::<Result<Vec<_>, _>>()
        .map_err(InsertFailure::Rejected)?;
    if let Some(existing) = find_conflict(&bookings, span, None) {
        return Err(InsertFailure::Rejected(AllocationRepositoryError::overlap(
            existing.allocation_id,
        )));
    }

    diesel::insert_into(allocations::table)
        .values(row)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl AllocationRepository for DieselAllocationRepository {
    async fn find_by_id(
        &self,
        id: &AllocationId,
    ) -> Result<Option<Allocation>, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = allocations::table
            .find(id.as_uuid())
            .select(AllocationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Allocation::from))
    }

    async fn bookings_for_resource(
        &self,
        resource: &ResourceId,
    ) -> Result<Vec<BookedInterval>, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_bookings(&mut conn, Some(*resource.as_uuid()))
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_booking)
            .collect()
    }

    async fn all_bookings(&self) -> Result<Vec<BookedInterval>, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_bookings(&mut conn, None)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_booking)
            .collect()
    }

    async fn list_details(&self) -> Result<Vec<AllocationDetails>, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = allocations::table
            .inner_join(events::table)
            .inner_join(resources::table)
            .order((events::start_time.asc(), allocations::id.asc()))
            .select((
                allocations::id,
                events::id,
                events::title,
                events::start_time,
                events::end_time,
                resources::id,
                resources::name,
            ))
            .load::<DetailsTuple>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(
                |(id, event_id, event_title, start_time, end_time, resource_id, resource_name)| {
                    AllocationDetails {
                        id: AllocationId::from_uuid(id),
                        event_id: EventId::from_uuid(event_id),
                        event_title,
                        start_time,
                        end_time,
                        resource_id: ResourceId::from_uuid(resource_id),
                        resource_name,
                    }
                },
            )
            .collect())
    }

    async fn insert_if_free(
        &self,
        allocation: &Allocation,
        span: &TimeSpan,
    ) -> Result<(), AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = AllocationRow::from(allocation);
        let span = *span;
        let outcome = conn
            .build_transaction()
            .read_committed()
            .run(|conn| async move { insert_locked(conn, &row, &span).await }.scope_boxed())
            .await;
        match outcome {
            Ok(()) => Ok(()),
            Err(InsertFailure::Rejected(error)) => Err(error),
            Err(InsertFailure::Database(error)) => Err(map_diesel_error(error)),
        }
    }

    async fn delete(&self, id: &AllocationId) -> Result<bool, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(allocations::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorKind;
    use rstest::rstest;

    #[rstest]
    fn serialization_failures_ask_for_a_retry() {
        let error = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::SerializationFailure,
            Box::new("could not serialize access".to_owned()),
        );
        assert!(matches!(
            map_diesel_error(error),
            AllocationRepositoryError::Retry { .. }
        ));
    }

    #[rstest]
    fn foreign_key_failures_report_missing_references() {
        let error = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("insert or update violates foreign key constraint".to_owned()),
        );
        assert_eq!(
            map_diesel_error(error),
            AllocationRepositoryError::missing_reference()
        );
    }

    #[rstest]
    fn inverted_rows_are_reported_as_query_errors() {
        let start = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 1, 10, 10, 0, 0)
            .single()
            .expect("valid instant");
        let err = to_booking((Uuid::nil(), Uuid::nil(), Uuid::nil(), start, start))
            .expect_err("zero-length span rejected");
        assert!(matches!(err, AllocationRepositoryError::Query { .. }));
    }
}
