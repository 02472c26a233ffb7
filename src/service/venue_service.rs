use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{BookingRepository, RatingRepository, TransactionRepository, VenueRepository},
};

pub struct VenueService {
    venue_repo: Arc<dyn VenueRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    rating_repo: Arc<dyn RatingRepository>,
    transaction_repo: Arc<dyn TransactionRepository>,
}

impl VenueService {
    pub fn new(
        venue_repo: Arc<dyn VenueRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        rating_repo: Arc<dyn RatingRepository>,
        transaction_repo: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self {
            venue_repo,
            booking_repo,
            rating_repo,
            transaction_repo,
        }
    }

    pub async fn create_venue(&self, owner: &User, request: CreateVenueRequest) -> Result<Venue> {
        Self::validate(&request.name, request.price_per_hour_cents,
            request.open_time, request.close_time)?;

        self.venue_repo.create(owner.id, request).await
    }

    pub async fn update_venue(
        &self,
        owner: &User,
        venue_id: Uuid,
        request: UpdateVenueRequest,
    ) -> Result<Venue> {
        let venue = self.venue_repo.find_by_id(venue_id).await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

        if venue.owner_id != owner.id {
            return Err(AppError::Forbidden);
        }

        let name = request.name.as_deref().unwrap_or(&venue.name);
        let price = request.price_per_hour_cents.unwrap_or(venue.price_per_hour_cents);
        let open = request.open_time.or(venue.open_time);
        let close = request.close_time.or(venue.close_time);
        Self::validate(name, price, open, close)?;

        self.venue_repo.update(venue_id, request).await
    }

    /// Deleting a venue takes its dependents with it: every booking and
    /// each booking's ratings and transactions are removed explicitly
    /// rather than through storage-layer cascade configuration.
    pub async fn delete_venue(&self, owner: &User, venue_id: Uuid) -> Result<()> {
        let venue = self.venue_repo.find_by_id(venue_id).await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

        if venue.owner_id != owner.id {
            return Err(AppError::Forbidden);
        }

        let bookings = self.booking_repo.list_by_venue(venue_id).await?;
        for booking in &bookings {
            self.rating_repo.delete_by_booking(booking.id).await?;
            self.transaction_repo.delete_by_booking(booking.id).await?;
            self.booking_repo.delete(booking.id).await?;
        }

        tracing::info!(
            "Deleted venue {} and {} dependent bookings",
            venue_id,
            bookings.len()
        );

        self.venue_repo.delete(venue_id).await
    }

    fn validate(
        name: &str,
        price_per_hour_cents: i64,
        open_time: Option<chrono::NaiveTime>,
        close_time: Option<chrono::NaiveTime>,
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Venue name is required".to_string()));
        }
        if price_per_hour_cents < 0 {
            return Err(AppError::Validation(
                "Hourly price cannot be negative".to_string(),
            ));
        }
        if let (Some(open), Some(close)) = (open_time, close_time) {
            if open >= close {
                return Err(AppError::Validation(
                    "Close time must be after open time".to_string(),
                ));
            }
        }
        Ok(())
    }
}
