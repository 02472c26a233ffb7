use std::sync::Arc;
use chrono::{Duration, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{
    config::BookingPolicyConfig,
    domain::*,
    error::{AppError, Result},
    payments::PaymentGateway,
    repository::{BookingRepository, RatingRepository, TransactionRepository, VenueRepository},
    scheduling::{self, SlotAvailability},
};

/// What `release` did to the booking: players cancel confirmed bookings
/// (status flip), owners remove blocked ones (row deleted).
#[derive(Debug)]
pub enum ReleaseOutcome {
    Cancelled(Booking),
    Removed,
}

pub struct BookingService {
    booking_repo: Arc<dyn BookingRepository>,
    venue_repo: Arc<dyn VenueRepository>,
    transaction_repo: Arc<dyn TransactionRepository>,
    rating_repo: Arc<dyn RatingRepository>,
    gateway: Arc<dyn PaymentGateway>,
    policy: BookingPolicyConfig,
}

impl BookingService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        venue_repo: Arc<dyn VenueRepository>,
        transaction_repo: Arc<dyn TransactionRepository>,
        rating_repo: Arc<dyn RatingRepository>,
        gateway: Arc<dyn PaymentGateway>,
        policy: BookingPolicyConfig,
    ) -> Self {
        Self {
            booking_repo,
            venue_repo,
            transaction_repo,
            rating_repo,
            gateway,
            policy,
        }
    }

    /// The slot grid for a venue on a date, marked against that day's
    /// bookings. Serves both the player booking page and the owner
    /// manage-slots view (which reads the booking refs off occupied slots).
    pub async fn availability(
        &self,
        venue_id: Uuid,
        date: chrono::NaiveDate,
    ) -> Result<Vec<SlotAvailability>> {
        let venue = self.venue_repo.find_by_id(venue_id).await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

        let bookings = self.booking_repo.list_for_venue_date(venue_id, date).await?;
        let slots = scheduling::slot_grid(
            venue.open_time,
            venue.close_time,
            self.policy.slot_minutes,
        );

        Ok(scheduling::mark_availability(
            &slots,
            &bookings,
            date,
            Utc::now().naive_utc(),
            self.policy.grace_minutes,
        ))
    }

    pub async fn create_booking(
        &self,
        player: &User,
        venue_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<Booking> {
        let venue = self.venue_repo.find_by_id(venue_id).await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

        // A replayed idempotency key maps back to the original booking
        // instead of creating a second one.
        if let Some(key) = &request.idempotency_key {
            if let Some(existing) = self.booking_repo
                .find_by_idempotency_key(player.id, key)
                .await?
            {
                return Ok(existing);
            }
        }

        self.validate_range(request.date, request.start_time, request.end_time)?;

        if request.player_count < 1 {
            return Err(AppError::Validation(
                "Player count must be at least 1".to_string(),
            ));
        }
        if venue.max_players > 0 && request.player_count > venue.max_players {
            return Err(AppError::Validation(format!(
                "This venue allows at most {} players",
                venue.max_players
            )));
        }

        let duration_minutes = (request.date.and_time(request.end_time)
            - request.date.and_time(request.start_time))
            .num_minutes();
        let total_price_cents = Self::price_cents(duration_minutes, venue.price_per_hour_cents);

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            venue_id,
            player_id: Some(player.id),
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            status: BookingStatus::Confirmed,
            block_reason: None,
            total_price_cents,
            player_count: request.player_count,
            idempotency_key: request.idempotency_key.clone(),
            booked_at: now,
            created_at: now,
            updated_at: now,
        };

        let booking = self.booking_repo.create(booking).await?;

        // Charge after the slot is held so a payment failure cannot leave a
        // paid-for slot someone else grabbed. On failure the booking is
        // cancelled and the failed attempt recorded.
        let description = format!("Booking {} at {}", booking.id, venue.name);
        match self.gateway.charge(total_price_cents, &description).await {
            Ok(()) => {
                self.record_transaction(booking.id, total_price_cents, TransactionStatus::Completed)
                    .await?;
                Ok(booking)
            }
            Err(err) => {
                self.record_transaction(booking.id, total_price_cents, TransactionStatus::Failed)
                    .await?;
                self.booking_repo
                    .update_status(booking.id, BookingStatus::Cancelled)
                    .await?;
                Err(err)
            }
        }
    }

    /// Owner marks a range as unavailable (maintenance etc.) by creating a
    /// playerless Blocked booking. The overlap invariant applies to blocks
    /// the same as to player bookings.
    pub async fn block_slot(
        &self,
        owner: &User,
        venue_id: Uuid,
        request: BlockSlotRequest,
    ) -> Result<Booking> {
        let venue = self.venue_repo.find_by_id(venue_id).await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

        if venue.owner_id != owner.id {
            return Err(AppError::Forbidden);
        }

        self.validate_range(request.date, request.start_time, request.end_time)?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            venue_id,
            player_id: None,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            status: BookingStatus::Blocked,
            block_reason: Some(request.reason.unwrap_or_else(|| "Maintenance".to_string())),
            total_price_cents: 0,
            player_count: 0,
            idempotency_key: None,
            booked_at: now,
            created_at: now,
            updated_at: now,
        };

        self.booking_repo.create(booking).await
    }

    /// Free a slot. Dispatches on the booking's status: players cancel
    /// their own Confirmed bookings within the notice window, owners remove
    /// Blocked entries from their venues outright.
    pub async fn release(&self, caller: &User, booking_id: Uuid) -> Result<ReleaseOutcome> {
        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        match booking.status {
            BookingStatus::Confirmed => {
                if booking.player_id != Some(caller.id) {
                    return Err(AppError::Forbidden);
                }
                if !Self::cancellation_allowed(
                    booking.start_datetime(),
                    Utc::now().naive_utc(),
                    self.policy.cancellation_notice_hours,
                ) {
                    return Err(AppError::CancellationWindow(
                        self.policy.cancellation_notice_hours,
                    ));
                }
                let cancelled = self.booking_repo
                    .update_status(booking_id, BookingStatus::Cancelled)
                    .await?;
                Ok(ReleaseOutcome::Cancelled(cancelled))
            }
            BookingStatus::Blocked => {
                let venue = self.venue_repo.find_by_id(booking.venue_id).await?
                    .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;
                if venue.owner_id != caller.id {
                    return Err(AppError::Forbidden);
                }
                self.rating_repo.delete_by_booking(booking_id).await?;
                self.transaction_repo.delete_by_booking(booking_id).await?;
                self.booking_repo.delete(booking_id).await?;
                Ok(ReleaseOutcome::Removed)
            }
            BookingStatus::Cancelled => Err(AppError::BadRequest(
                "Booking is already cancelled".to_string(),
            )),
        }
    }

    /// Strict inequality: a booking starting exactly `notice_hours` from
    /// now can no longer be cancelled.
    pub fn cancellation_allowed(
        start: NaiveDateTime,
        now: NaiveDateTime,
        notice_hours: i64,
    ) -> bool {
        now + Duration::hours(notice_hours) < start
    }

    /// Exact integer-cent pricing: slot-aligned durations keep
    /// `minutes * rate` divisible by 60, so no rounding occurs.
    pub fn price_cents(duration_minutes: i64, price_per_hour_cents: i64) -> i64 {
        duration_minutes * price_per_hour_cents / 60
    }

    fn validate_range(
        &self,
        date: chrono::NaiveDate,
        start: chrono::NaiveTime,
        end: chrono::NaiveTime,
    ) -> Result<()> {
        if start >= end {
            return Err(AppError::Validation(
                "End time must be after start time".to_string(),
            ));
        }
        if !scheduling::is_slot_aligned(start, end, self.policy.slot_minutes) {
            return Err(AppError::Validation(format!(
                "Times must fall on {}-minute slot boundaries",
                self.policy.slot_minutes
            )));
        }
        if date < Utc::now().date_naive() {
            return Err(AppError::PastDate);
        }
        Ok(())
    }

    async fn record_transaction(
        &self,
        booking_id: Uuid,
        amount_cents: i64,
        status: TransactionStatus,
    ) -> Result<Transaction> {
        self.transaction_repo
            .create(Transaction {
                id: Uuid::new_v4(),
                booking_id,
                amount_cents,
                status,
                created_at: Utc::now(),
            })
            .await
    }
}
