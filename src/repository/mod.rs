use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod user_repository;
pub mod venue_repository;
pub mod booking_repository;
pub mod rating_repository;
pub mod transaction_repository;

pub use user_repository::SqliteUserRepository;
pub use venue_repository::SqliteVenueRepository;
pub use booking_repository::SqliteBookingRepository;
pub use rating_repository::SqliteRatingRepository;
pub use transaction_repository::SqliteTransactionRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_profile(&self, id: Uuid, update: UpdateProfileRequest) -> Result<User>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
}

#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, venue: CreateVenueRequest) -> Result<Venue>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Venue>>;
    async fn list(&self) -> Result<Vec<Venue>>;
    async fn list_by_sport(&self, sport: &str) -> Result<Vec<Venue>>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Venue>>;
    async fn update(&self, id: Uuid, update: UpdateVenueRequest) -> Result<Venue>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking, enforcing the no-overlap invariant. The overlap
    /// check and insert run in one transaction, with the partial unique
    /// index on (venue, date, start_time) as the storage-level backstop.
    /// Fails with `SlotTaken` when the range collides with an existing
    /// Confirmed or Blocked booking.
    async fn create(&self, booking: Booking) -> Result<Booking>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>>;
    async fn find_by_idempotency_key(&self, player_id: Uuid, key: &str)
        -> Result<Option<Booking>>;
    async fn list_by_player(&self, player_id: Uuid) -> Result<Vec<Booking>>;
    async fn list_by_venue(&self, venue_id: Uuid) -> Result<Vec<Booking>>;
    async fn list_for_venue_date(&self, venue_id: Uuid, date: NaiveDate)
        -> Result<Vec<Booking>>;
    async fn list_today_for_owner(&self, owner_id: Uuid, date: NaiveDate)
        -> Result<Vec<Booking>>;
    async fn list_recent_for_owner(&self, owner_id: Uuid, limit: i64) -> Result<Vec<Booking>>;
    /// Count and summed revenue of the owner's Confirmed bookings with
    /// `from <= date <= to`.
    async fn confirmed_stats_for_owner(
        &self,
        owner_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(i64, i64)>;
    async fn update_status(&self, id: Uuid, status: BookingStatus) -> Result<Booking>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn create(&self, rating: Rating) -> Result<Rating>;
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Rating>>;
    async fn list_by_venue(&self, venue_id: Uuid) -> Result<Vec<Rating>>;
    async fn average_for_owner(&self, owner_id: Uuid) -> Result<Option<f64>>;
    async fn delete_by_booking(&self, booking_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(&self, transaction: Transaction) -> Result<Transaction>;
    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<Transaction>>;
    async fn list_for_owner(&self, owner_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<Transaction>>;
    async fn delete_by_booking(&self, booking_id: Uuid) -> Result<()>;
}
