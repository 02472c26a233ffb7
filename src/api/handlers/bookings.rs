use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{
        handlers::venues::RatingDto,
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::{Booking, BookingStatus, CreateBookingRequest, CreateRatingRequest, Transaction, TransactionStatus},
    error::{AppError, Result},
    service::ReleaseOutcome,
};

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SlotDto {
    pub start_time: String,
    pub end_time: String,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub date: String,
    pub slots: Vec<SlotDto>,
}

/// Player-facing slot view: which slots on the grid can still be booked.
pub async fn availability(
    State(state): State<AppState>,
    Path(venue_id): Path<Uuid>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityResponse>> {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let slots = state.service_context.booking_service
        .availability(venue_id, date)
        .await?;

    Ok(Json(AvailabilityResponse {
        date: date.to_string(),
        slots: slots
            .into_iter()
            .map(|s| SlotDto {
                start_time: s.start.format("%H:%M").to_string(),
                end_time: s.end.format("%H:%M").to_string(),
                available: s.available,
            })
            .collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct BookingDto {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub player_id: Option<Uuid>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
    pub block_reason: Option<String>,
    pub total_price_cents: i64,
    pub player_count: i32,
    pub is_completed: bool,
    pub booked_at: String,
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        let is_completed = booking.is_completed(Utc::now().naive_utc());
        Self {
            id: booking.id,
            venue_id: booking.venue_id,
            player_id: booking.player_id,
            date: booking.date.to_string(),
            start_time: booking.start_time.format("%H:%M").to_string(),
            end_time: booking.end_time.format("%H:%M").to_string(),
            status: booking.status,
            block_reason: booking.block_reason,
            total_price_cents: booking.total_price_cents,
            player_count: booking.player_count,
            is_completed,
            booked_at: booking.booked_at.to_rfc3339(),
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(venue_id): Path<Uuid>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingDto>)> {
    let booking = state.service_context.booking_service
        .create_booking(&current_user.user, venue_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

#[derive(Debug, Serialize)]
pub struct ListBookingsResponse {
    pub bookings: Vec<BookingDto>,
    pub total: usize,
}

pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<ListBookingsResponse>> {
    let bookings = state.service_context.booking_repo
        .list_by_player(current_user.user.id)
        .await?;

    let total = bookings.len();
    let bookings: Vec<BookingDto> = bookings.into_iter().map(Into::into).collect();

    Ok(Json(ListBookingsResponse { bookings, total }))
}

#[derive(Debug, Serialize)]
pub struct TransactionDto {
    pub id: Uuid,
    pub amount_cents: i64,
    pub status: TransactionStatus,
    pub created_at: String,
}

impl From<Transaction> for TransactionDto {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            amount_cents: transaction.amount_cents,
            status: transaction.status,
            created_at: transaction.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub booking: BookingDto,
    pub venue_name: String,
    pub transactions: Vec<TransactionDto>,
}

/// Booking receipt: visible to the booking's player and the venue's owner.
pub async fn receipt(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReceiptResponse>> {
    let booking = state.service_context.booking_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let venue = state.service_context.venue_repo
        .find_by_id(booking.venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

    let is_player = booking.player_id == Some(current_user.user.id);
    let is_venue_owner = venue.owner_id == current_user.user.id;
    if !is_player && !is_venue_owner {
        return Err(AppError::Forbidden);
    }

    let transactions = state.service_context.transaction_repo
        .list_by_booking(id)
        .await?;

    Ok(Json(ReceiptResponse {
        booking: booking.into(),
        venue_name: venue.name,
        transactions: transactions.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub outcome: String,
    pub booking: Option<BookingDto>,
}

/// Unified release: player cancellation of a confirmed booking or owner
/// removal of a blocked slot, depending on who calls and what the booking is.
pub async fn release(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReleaseResponse>> {
    let outcome = state.service_context.booking_service
        .release(&current_user.user, id)
        .await?;

    let response = match outcome {
        ReleaseOutcome::Cancelled(booking) => ReleaseResponse {
            outcome: "cancelled".to_string(),
            booking: Some(booking.into()),
        },
        ReleaseOutcome::Removed => ReleaseResponse {
            outcome: "removed".to_string(),
            booking: None,
        },
    };

    Ok(Json(response))
}

pub async fn rate(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateRatingRequest>,
) -> Result<(StatusCode, Json<RatingDto>)> {
    let rating = state.service_context.rating_service
        .rate_booking(&current_user.user, id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(rating.into())))
}
