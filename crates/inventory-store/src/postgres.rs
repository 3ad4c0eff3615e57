use async_trait::async_trait;
use chrono::Utc;
use common::{BookingId, EventId, OwnerId};
use domain::{Booking, BookingStatus, EventInventory, Money, Resource, SeatId};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgPoolOptions, postgres::PgRow};
use uuid::Uuid;

use crate::{
    BookingQuery, ChangeSet, Removal, Result, StoreError, Version, Versioned, change::Write,
    store::ReservationStore,
};

const INVENTORY_COLUMNS: &str =
    "id, total_seats, available_seats, booked_seat_ids, unit_price_cents, version";
const BOOKING_COLUMNS: &str = "id, owner_id, event_id, seat_ids, total_amount_cents, status, created_at, updated_at, version";

/// PostgreSQL-backed reservation store.
///
/// A commit runs in one transaction. Inserts use `ON CONFLICT DO NOTHING` and
/// updates are conditional on the expected version, so a record changed by a
/// concurrent transaction affects zero rows and rolls the whole commit back.
#[derive(Clone)]
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a new PostgreSQL reservation store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `database_url` with at most `max_connections`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_inventory(row: PgRow) -> Result<Versioned<EventInventory>> {
        let id = EventId::from_uuid(row.try_get::<Uuid, _>("id")?);
        let total: i32 = row.try_get("total_seats")?;
        let available: i32 = row.try_get("available_seats")?;
        let booked: Vec<String> = row.try_get("booked_seat_ids")?;
        let price = Money::from_cents(row.try_get("unit_price_cents")?);

        let inventory = EventInventory::from_parts(
            id,
            to_count(total, "total_seats")?,
            to_count(available, "available_seats")?,
            booked.into_iter().map(SeatId::new),
            price,
        )
        .map_err(|e| StoreError::Corrupt(format!("inventory {id}: {e}")))?;

        Ok(Versioned::new(
            inventory,
            Version::new(row.try_get("version")?),
        ))
    }

    fn row_to_booking(row: PgRow) -> Result<Versioned<Booking>> {
        let id = BookingId::from_uuid(row.try_get::<Uuid, _>("id")?);
        let seat_ids: Vec<String> = row.try_get("seat_ids")?;
        let status: String = row.try_get("status")?;
        let status: BookingStatus = status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("booking {id}: {e}")))?;

        let booking = Booking::from_parts(
            id,
            OwnerId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
            EventId::from_uuid(row.try_get::<Uuid, _>("event_id")?),
            seat_ids.into_iter().map(SeatId::new).collect(),
            Money::from_cents(row.try_get("total_amount_cents")?),
            status,
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
        );

        Ok(Versioned::new(booking, Version::new(row.try_get("version")?)))
    }

    async fn current_version(
        tx: &mut Transaction<'_, Postgres>,
        table: &str,
        id: Uuid,
    ) -> Result<Version> {
        let sql = format!("SELECT version FROM {table} WHERE id = $1");
        let version: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(Version::new(version.unwrap_or(0)))
    }

    async fn write_inventory(
        tx: &mut Transaction<'_, Postgres>,
        write: &Write<EventInventory>,
    ) -> Result<()> {
        let inv = &write.record;
        let booked: Vec<String> = inv
            .booked_seat_ids()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        let now = Utc::now();

        let query = if write.is_insert() {
            sqlx::query(
                r#"
                INSERT INTO event_inventories
                    (id, total_seats, available_seats, booked_seat_ids, unit_price_cents, version, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, 1, $6, $6)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
        } else {
            sqlx::query(
                r#"
                UPDATE event_inventories
                SET total_seats = $2, available_seats = $3, booked_seat_ids = $4,
                    unit_price_cents = $5, version = version + 1, updated_at = $6
                WHERE id = $1 AND version = $7
                "#,
            )
        };

        let mut query = query
            .bind(inv.id().as_uuid())
            .bind(to_column(inv.total_seats())?)
            .bind(to_column(inv.available_seats())?)
            .bind(booked)
            .bind(inv.unit_price().cents())
            .bind(now);
        if !write.is_insert() {
            query = query.bind(write.expected.as_i64());
        }

        let result = query
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, Resource::Event, inv.id(), write.expected))?;

        if result.rows_affected() == 0 {
            let actual = Self::current_version(tx, "event_inventories", inv.id().as_uuid()).await?;
            return Err(StoreError::Conflict {
                resource: Resource::Event,
                id: inv.id().to_string(),
                expected: write.expected,
                actual,
            });
        }
        Ok(())
    }

    async fn remove_inventory(
        tx: &mut Transaction<'_, Postgres>,
        removal: &Removal,
    ) -> Result<()> {
        let id = removal.event_id.as_uuid();
        let result = sqlx::query("DELETE FROM event_inventories WHERE id = $1 AND version = $2")
            .bind(id)
            .bind(removal.expected.as_i64())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, Resource::Event, removal.event_id, removal.expected))?;

        if result.rows_affected() == 0 {
            let actual = Self::current_version(tx, "event_inventories", id).await?;
            return Err(StoreError::Conflict {
                resource: Resource::Event,
                id: removal.event_id.to_string(),
                expected: removal.expected,
                actual,
            });
        }
        Ok(())
    }

    async fn write_booking(
        tx: &mut Transaction<'_, Postgres>,
        write: &Write<Booking>,
    ) -> Result<()> {
        let booking = &write.record;
        let seat_ids: Vec<String> = booking
            .seat_ids()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let query = if write.is_insert() {
            sqlx::query(
                r#"
                INSERT INTO bookings
                    (id, owner_id, event_id, seat_ids, total_amount_cents, status, created_at, updated_at, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
        } else {
            sqlx::query(
                r#"
                UPDATE bookings
                SET owner_id = $2, event_id = $3, seat_ids = $4, total_amount_cents = $5,
                    status = $6, created_at = $7, updated_at = $8, version = version + 1
                WHERE id = $1 AND version = $9
                "#,
            )
        };

        let mut query = query
            .bind(booking.id().as_uuid())
            .bind(booking.owner_id().as_uuid())
            .bind(booking.event_id().as_uuid())
            .bind(seat_ids)
            .bind(booking.total_amount().cents())
            .bind(booking.status().as_str())
            .bind(booking.created_at())
            .bind(booking.updated_at());
        if !write.is_insert() {
            query = query.bind(write.expected.as_i64());
        }

        let result = query
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, Resource::Booking, booking.id(), write.expected))?;

        if result.rows_affected() == 0 {
            let actual = Self::current_version(tx, "bookings", booking.id().as_uuid()).await?;
            return Err(StoreError::Conflict {
                resource: Resource::Booking,
                id: booking.id().to_string(),
                expected: write.expected,
                actual,
            });
        }
        Ok(())
    }
}

fn to_count(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {column}: {value}")))
}

fn to_column(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| StoreError::Corrupt(format!("seat count out of range: {value}")))
}

/// Serialization failures, deadlocks and unique violations mean another
/// transaction won the race.
fn map_write_error(
    e: sqlx::Error,
    resource: Resource,
    id: impl ToString,
    expected: Version,
) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && matches!(db_err.code().as_deref(), Some("40001") | Some("40P01") | Some("23505"))
    {
        return StoreError::Conflict {
            resource,
            id: id.to_string(),
            expected,
            actual: expected.next(),
        };
    }
    StoreError::Database(e)
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn load_inventory(
        &self,
        event_id: EventId,
    ) -> Result<Option<Versioned<EventInventory>>> {
        let sql = format!("SELECT {INVENTORY_COLUMNS} FROM event_inventories WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(event_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_inventory).transpose()
    }

    async fn load_booking(&self, booking_id: BookingId) -> Result<Option<Versioned<Booking>>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(booking_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_booking).transpose()
    }

    #[tracing::instrument(skip(self, changes), fields(writes = changes.len()))]
    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Removals last; a deleted inventory has no staged writes.
        for write in changes.inventories() {
            Self::write_inventory(&mut tx, write).await?;
        }
        for write in changes.bookings() {
            Self::write_booking(&mut tx, write).await?;
        }
        for removal in changes.removals() {
            Self::remove_inventory(&mut tx, removal).await?;
        }

        tx.commit().await?;
        tracing::debug!("reservation changes committed");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn query_bookings(&self, query: BookingQuery) -> Result<Vec<Booking>> {
        let mut sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.owner_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND owner_id = ${param_count}"));
        }
        if query.event_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND event_id = ${param_count}"));
        }
        if query.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);
        if let Some(owner_id) = query.owner_id {
            sqlx_query = sqlx_query.bind(owner_id.as_uuid());
        }
        if let Some(event_id) = query.event_id {
            sqlx_query = sqlx_query.bind(event_id.as_uuid());
        }
        if let Some(status) = query.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| Self::row_to_booking(row).map(Versioned::into_inner))
            .collect()
    }

    async fn list_inventories(&self) -> Result<Vec<EventInventory>> {
        let sql = format!("SELECT {INVENTORY_COLUMNS} FROM event_inventories ORDER BY id ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| Self::row_to_inventory(row).map(Versioned::into_inner))
            .collect()
    }
}
