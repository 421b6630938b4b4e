//! PostgreSQL-backed `EventRepository` adapter.
//!
//! Event deletion removes allocations, then attendee rows, then the event in
//! one transaction, so a failure part-way leaves every row in place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{EventRepository, EventRepositoryError};
use crate::domain::{Event, EventId, UserId};

use super::diesel_basic_error_mapping::{
    Violation, map_basic_diesel_error, map_basic_pool_error, map_corrupt_row, violation,
};
use super::models::{EventRow, NewAttendeeRow};
use super::pool::{DbPool, PoolError};
use super::schema::{allocations, event_attendees, events};

/// Diesel-backed event store.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EventRepositoryError {
    map_basic_pool_error(error, EventRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> EventRepositoryError {
    if violation(&error) == Some(Violation::ForeignKey) {
        return EventRepositoryError::missing_event();
    }
    map_basic_diesel_error(
        error,
        EventRepositoryError::query,
        EventRepositoryError::connection,
    )
}

fn decode(rows: Vec<EventRow>) -> Result<Vec<Event>, EventRepositoryError> {
    rows.into_iter()
        .map(|row| {
            Event::try_from(row).map_err(|err| map_corrupt_row(err, EventRepositoryError::query))
        })
        .collect()
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(events::table)
            .values(EventRow::from(event))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = events::table
            .find(id.as_uuid())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Event::try_from)
            .transpose()
            .map_err(|err| map_corrupt_row(err, EventRepositoryError::query))
    }

    async fn list(&self) -> Result<Vec<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = events::table
            .order((events::start_time.asc(), events::id.asc()))
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode(rows)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = events::table
            .filter(events::owner_id.eq(owner.as_uuid()))
            .order((events::start_time.asc(), events::id.asc()))
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode(rows)
    }

    async fn delete_with_dependents(&self, id: &EventId) -> Result<bool, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let event_id = *id.as_uuid();
        let (released, deleted) = conn
            .transaction(|conn| {
                async move {
                    let released = diesel::delete(
                        allocations::table.filter(allocations::event_id.eq(event_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(
                        event_attendees::table.filter(event_attendees::event_id.eq(event_id)),
                    )
                    .execute(conn)
                    .await?;
                    let deleted = diesel::delete(events::table.find(event_id))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((released, deleted))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        debug!(event_id = %id, released, deleted, "event delete committed");
        Ok(deleted > 0)
    }

    async fn add_attendee(
        &self,
        event: &EventId,
        user: &UserId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(event_attendees::table)
            .values(NewAttendeeRow {
                event_id: *event.as_uuid(),
                user_id: *user.as_uuid(),
                registered_at,
            })
            .on_conflict((event_attendees::event_id, event_attendees::user_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
