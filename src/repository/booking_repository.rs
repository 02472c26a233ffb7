use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Booking, BookingStatus},
    error::{AppError, Result},
    repository::BookingRepository,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(FromRow)]
struct BookingRow {
    id: String,
    venue_id: String,
    player_id: Option<String>,
    date: String,
    start_time: String,
    end_time: String,
    status: String,
    block_reason: Option<String>,
    total_price_cents: i64,
    player_count: i32,
    idempotency_key: Option<String>,
    booked_at: NaiveDateTime,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const SELECT_BOOKING: &str = r#"
    SELECT id, venue_id, player_id, date, start_time, end_time, status,
           block_reason, total_price_cents, player_count, idempotency_key,
           booked_at, created_at, updated_at
    FROM bookings
"#;

pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_booking(row: BookingRow) -> Result<Booking> {
        Ok(Booking {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            venue_id: Uuid::parse_str(&row.venue_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            player_id: row.player_id
                .map(|s| Uuid::parse_str(&s).map_err(|e| AppError::Database(e.to_string())))
                .transpose()?,
            date: Self::parse_date(&row.date)?,
            start_time: Self::parse_time(&row.start_time)?,
            end_time: Self::parse_time(&row.end_time)?,
            status: Self::parse_status(&row.status)?,
            block_reason: row.block_reason,
            total_price_cents: row.total_price_cents,
            player_count: row.player_count,
            idempotency_key: row.idempotency_key,
            booked_at: DateTime::from_naive_utc_and_offset(row.booked_at, Utc),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_date(s: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|e| AppError::Database(format!("Invalid date value '{}': {}", s, e)))
    }

    fn parse_time(s: &str) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(s, TIME_FORMAT)
            .map_err(|e| AppError::Database(format!("Invalid time value '{}': {}", s, e)))
    }

    fn date_to_str(d: &NaiveDate) -> String {
        d.format(DATE_FORMAT).to_string()
    }

    fn time_to_str(t: &NaiveTime) -> String {
        t.format(TIME_FORMAT).to_string()
    }

    fn parse_status(s: &str) -> Result<BookingStatus> {
        match s {
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            "Blocked" => Ok(BookingStatus::Blocked),
            _ => Err(AppError::Database(format!("Invalid booking status: {}", s))),
        }
    }

    fn status_to_str(status: &BookingStatus) -> &'static str {
        match status {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Blocked => "Blocked",
        }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn create(&self, booking: Booking) -> Result<Booking> {
        let id_str = booking.id.to_string();
        let venue_id_str = booking.venue_id.to_string();
        let player_id_str = booking.player_id.map(|id| id.to_string());
        let date_str = Self::date_to_str(&booking.date);
        let start_str = Self::time_to_str(&booking.start_time);
        let end_str = Self::time_to_str(&booking.end_time);
        let status_str = Self::status_to_str(&booking.status);
        let booked_at_naive = booking.booked_at.naive_utc();
        let now_naive = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Overlap check and insert share one transaction so two racing
        // submissions cannot both pass the check. The partial unique index
        // on (venue_id, date, start_time) catches same-start races that
        // slip past serialization.
        let conflicts: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE venue_id = ? AND date = ?
              AND status IN ('Confirmed', 'Blocked')
              AND start_time < ? AND ? < end_time
            "#
        )
        .bind(&venue_id_str)
        .bind(&date_str)
        .bind(&end_str)
        .bind(&start_str)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if conflicts > 0 {
            return Err(AppError::SlotTaken);
        }

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, venue_id, player_id, date, start_time, end_time, status,
                block_reason, total_price_cents, player_count, idempotency_key,
                booked_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&venue_id_str)
        .bind(&player_id_str)
        .bind(&date_str)
        .bind(&start_str)
        .bind(&end_str)
        .bind(status_str)
        .bind(&booking.block_reason)
        .bind(booking.total_price_cents)
        .bind(booking.player_count)
        .bind(&booking.idempotency_key)
        .bind(booked_at_naive)
        .bind(now_naive)
        .bind(now_naive)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                if db.message().contains("idempotency") {
                    AppError::Conflict("Duplicate booking submission".to_string())
                } else {
                    AppError::SlotTaken
                }
            }
            _ => AppError::Database(e.to_string()),
        })?;

        tx.commit().await.map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(booking.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created booking".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, BookingRow>(
            &format!("{} WHERE id = ?", SELECT_BOOKING)
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_booking(r)?)),
            None => Ok(None)
        }
    }

    async fn find_by_idempotency_key(
        &self,
        player_id: Uuid,
        key: &str,
    ) -> Result<Option<Booking>> {
        let player_id_str = player_id.to_string();
        let row = sqlx::query_as::<_, BookingRow>(
            &format!(
                "{} WHERE player_id = ? AND idempotency_key = ? AND status != 'Cancelled'",
                SELECT_BOOKING
            )
        )
        .bind(player_id_str)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_booking(r)?)),
            None => Ok(None)
        }
    }

    async fn list_by_player(&self, player_id: Uuid) -> Result<Vec<Booking>> {
        let player_id_str = player_id.to_string();
        let rows = sqlx::query_as::<_, BookingRow>(
            &format!("{} WHERE player_id = ? ORDER BY date DESC, start_time DESC", SELECT_BOOKING)
        )
        .bind(player_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn list_by_venue(&self, venue_id: Uuid) -> Result<Vec<Booking>> {
        let venue_id_str = venue_id.to_string();
        let rows = sqlx::query_as::<_, BookingRow>(
            &format!("{} WHERE venue_id = ? ORDER BY date DESC, start_time DESC", SELECT_BOOKING)
        )
        .bind(venue_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn list_for_venue_date(&self, venue_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>> {
        let venue_id_str = venue_id.to_string();
        let date_str = Self::date_to_str(&date);
        let rows = sqlx::query_as::<_, BookingRow>(
            &format!("{} WHERE venue_id = ? AND date = ? ORDER BY start_time", SELECT_BOOKING)
        )
        .bind(venue_id_str)
        .bind(date_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn list_today_for_owner(&self, owner_id: Uuid, date: NaiveDate) -> Result<Vec<Booking>> {
        let owner_id_str = owner_id.to_string();
        let date_str = Self::date_to_str(&date);
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.venue_id, b.player_id, b.date, b.start_time, b.end_time,
                   b.status, b.block_reason, b.total_price_cents, b.player_count,
                   b.idempotency_key, b.booked_at, b.created_at, b.updated_at
            FROM bookings b
            JOIN venues v ON v.id = b.venue_id
            WHERE v.owner_id = ? AND b.date = ? AND b.status != 'Cancelled'
            ORDER BY b.start_time
            "#
        )
        .bind(owner_id_str)
        .bind(date_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn list_recent_for_owner(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Booking>> {
        let owner_id_str = owner_id.to_string();
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.venue_id, b.player_id, b.date, b.start_time, b.end_time,
                   b.status, b.block_reason, b.total_price_cents, b.player_count,
                   b.idempotency_key, b.booked_at, b.created_at, b.updated_at
            FROM bookings b
            JOIN venues v ON v.id = b.venue_id
            WHERE v.owner_id = ?
            ORDER BY b.booked_at DESC
            LIMIT ?
            "#
        )
        .bind(owner_id_str)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn confirmed_stats_for_owner(
        &self,
        owner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(i64, i64)> {
        let owner_id_str = owner_id.to_string();
        let from_str = Self::date_to_str(&from);
        let to_str = Self::date_to_str(&to);

        let row: (i64, Option<i64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), SUM(b.total_price_cents)
            FROM bookings b
            JOIN venues v ON v.id = b.venue_id
            WHERE v.owner_id = ? AND b.status = 'Confirmed'
              AND b.date >= ? AND b.date <= ?
            "#
        )
        .bind(owner_id_str)
        .bind(from_str)
        .bind(to_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((row.0, row.1.unwrap_or(0)))
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<Booking> {
        let id_str = id.to_string();
        let status_str = Self::status_to_str(&status);
        let now_naive = Utc::now().naive_utc();

        sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status_str)
            .bind(now_naive)
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Booking not found".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
