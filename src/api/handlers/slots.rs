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
        handlers::bookings::BookingDto,
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::{BlockSlotRequest, BookingStatus},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ManageSlotsParams {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ManagedSlotDto {
    pub start_time: String,
    pub end_time: String,
    pub available: bool,
    pub booking_id: Option<Uuid>,
    pub booking_status: Option<BookingStatus>,
}

#[derive(Debug, Serialize)]
pub struct ManageSlotsResponse {
    pub date: String,
    pub slots: Vec<ManagedSlotDto>,
}

/// Owner manage-slots view: the day's grid with the occupying booking for
/// each taken slot, so blocked entries can be released.
pub async fn manage_view(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(venue_id): Path<Uuid>,
    Query(params): Query<ManageSlotsParams>,
) -> Result<Json<ManageSlotsResponse>> {
    let venue = state.service_context.venue_repo
        .find_by_id(venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

    if venue.owner_id != current_user.user.id {
        return Err(AppError::Forbidden);
    }

    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let slots = state.service_context.booking_service
        .availability(venue_id, date)
        .await?;

    Ok(Json(ManageSlotsResponse {
        date: date.to_string(),
        slots: slots
            .into_iter()
            .map(|s| ManagedSlotDto {
                start_time: s.start.format("%H:%M").to_string(),
                end_time: s.end.format("%H:%M").to_string(),
                available: s.available,
                booking_id: s.booking_id,
                booking_status: s.booking_status,
            })
            .collect(),
    }))
}

pub async fn block(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(venue_id): Path<Uuid>,
    Json(request): Json<BlockSlotRequest>,
) -> Result<(StatusCode, Json<BookingDto>)> {
    let booking = state.service_context.booking_service
        .block_slot(&current_user.user, venue_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}
