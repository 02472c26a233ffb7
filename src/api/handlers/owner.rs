use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{
        handlers::bookings::{BookingDto, TransactionDto},
        middleware::auth::CurrentUser,
        state::AppState,
    },
    error::{AppError, Result},
    service::{OwnerStats, TodaySchedule},
};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: OwnerStats,
    pub recent_bookings: Vec<BookingDto>,
    pub today_schedule: Option<TodaySchedule>,
}

const RECENT_BOOKINGS_LIMIT: i64 = 5;

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardResponse>> {
    let owner_id = current_user.user.id;

    let range = match (params.from, params.to) {
        (Some(from), Some(to)) => {
            if from > to {
                return Err(AppError::Validation(
                    "Range start must not be after range end".to_string(),
                ));
            }
            Some((from, to))
        }
        _ => None,
    };

    let stats = state.service_context.analytics_service
        .owner_stats(owner_id, range)
        .await?;

    let recent = state.service_context.booking_repo
        .list_recent_for_owner(owner_id, RECENT_BOOKINGS_LIMIT)
        .await?;

    let today_schedule = state.service_context.analytics_service
        .today_schedule(owner_id, Utc::now().date_naive())
        .await?;

    Ok(Json(DashboardResponse {
        stats,
        recent_bookings: recent.into_iter().map(Into::into).collect(),
        today_schedule,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListTransactionsParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn transactions(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<ListTransactionsParams>,
) -> Result<Json<Vec<TransactionDto>>> {
    let transactions = state.service_context.transaction_repo
        .list_for_owner(current_user.user.id, params.limit, params.offset)
        .await?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Serialize)]
pub struct VenueBookingsResponse {
    pub bookings: Vec<BookingDto>,
    pub total: usize,
}

pub async fn venue_bookings(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<VenueBookingsResponse>> {
    let venue = state.service_context.venue_repo
        .find_by_id(venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

    if venue.owner_id != current_user.user.id {
        return Err(AppError::Forbidden);
    }

    let bookings = state.service_context.booking_repo
        .list_by_venue(venue_id)
        .await?;

    let total = bookings.len();

    Ok(Json(VenueBookingsResponse {
        bookings: bookings.into_iter().map(Into::into).collect(),
        total,
    }))
}
