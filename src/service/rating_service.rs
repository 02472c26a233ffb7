use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{BookingRepository, RatingRepository},
};

pub struct RatingService {
    rating_repo: Arc<dyn RatingRepository>,
    booking_repo: Arc<dyn BookingRepository>,
}

impl RatingService {
    pub fn new(
        rating_repo: Arc<dyn RatingRepository>,
        booking_repo: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            rating_repo,
            booking_repo,
        }
    }

    /// One rating per booking, by its player, once the booking has run its
    /// course. Ratings are immutable after creation.
    pub async fn rate_booking(
        &self,
        player: &User,
        booking_id: Uuid,
        request: CreateRatingRequest,
    ) -> Result<Rating> {
        if !(1..=5).contains(&request.score) {
            return Err(AppError::Validation(
                "Score must be between 1 and 5".to_string(),
            ));
        }

        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.player_id != Some(player.id) {
            return Err(AppError::Forbidden);
        }

        let now = Utc::now();
        if !booking.is_completed(now.naive_utc()) {
            return Err(AppError::Validation(
                "Only completed bookings can be rated".to_string(),
            ));
        }

        if self.rating_repo.find_by_booking(booking_id).await?.is_some() {
            return Err(AppError::Conflict(
                "This booking has already been rated".to_string(),
            ));
        }

        self.rating_repo
            .create(Rating {
                id: Uuid::new_v4(),
                booking_id,
                venue_id: booking.venue_id,
                player_id: player.id,
                score: request.score,
                comment: request.comment,
                created_at: now,
            })
            .await
    }
}
