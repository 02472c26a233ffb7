use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub venue_id: Uuid,
    /// None for owner-created maintenance blocks.
    pub player_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub block_reason: Option<String>,
    pub total_price_cents: i64,
    pub player_count: i32,
    pub idempotency_key: Option<String>,
    pub booked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Blocked,
}

impl Booking {
    pub fn start_datetime(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn end_datetime(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    /// A confirmed booking whose end time has elapsed counts as completed.
    /// Derived on read, never persisted.
    pub fn is_completed(&self, now: chrono::NaiveDateTime) -> bool {
        self.status == BookingStatus::Confirmed && self.end_datetime() <= now
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_datetime() - self.start_datetime()).num_minutes()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_player_count")]
    pub player_count: i32,
    pub idempotency_key: Option<String>,
}

fn default_player_count() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockSlotRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub reason: Option<String>,
}
