use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateVenueRequest, Rating, UpdateVenueRequest, Venue},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListVenuesParams {
    pub sport: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VenueDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub location: String,
    pub sport: String,
    pub price_per_hour_cents: i64,
    pub max_players: i32,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub description: String,
    pub maps_link: Option<String>,
    pub image_url: Option<String>,
    pub amenities: Vec<String>,
    pub custom_amenities: Vec<String>,
}

impl From<Venue> for VenueDto {
    fn from(venue: Venue) -> Self {
        Self {
            id: venue.id,
            owner_id: venue.owner_id,
            name: venue.name,
            location: venue.location,
            sport: venue.sport,
            price_per_hour_cents: venue.price_per_hour_cents,
            max_players: venue.max_players,
            open_time: venue.open_time.map(|t| t.format("%H:%M").to_string()),
            close_time: venue.close_time.map(|t| t.format("%H:%M").to_string()),
            description: venue.description,
            maps_link: venue.maps_link,
            image_url: venue.image_url,
            amenities: venue.amenities,
            custom_amenities: venue.custom_amenities,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListVenuesResponse {
    pub venues: Vec<VenueDto>,
    pub total: usize,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListVenuesParams>,
) -> Result<Json<ListVenuesResponse>> {
    let venues = match params.sport.as_deref() {
        Some(sport) => state.service_context.venue_repo.list_by_sport(sport).await?,
        None => state.service_context.venue_repo.list().await?,
    };

    let total = venues.len();
    let venues: Vec<VenueDto> = venues.into_iter().map(Into::into).collect();

    Ok(Json(ListVenuesResponse { venues, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VenueDto>> {
    let venue = state.service_context.venue_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

    Ok(Json(venue.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(request): Json<CreateVenueRequest>,
) -> Result<(StatusCode, Json<VenueDto>)> {
    let venue = state.service_context.venue_service
        .create_venue(&current_user.user, request)
        .await?;

    Ok((StatusCode::CREATED, Json(venue.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVenueRequest>,
) -> Result<Json<VenueDto>> {
    let venue = state.service_context.venue_service
        .update_venue(&current_user.user, id, request)
        .await?;

    Ok(Json(venue.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.venue_service
        .delete_venue(&current_user.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct RatingDto {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<Rating> for RatingDto {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            booking_id: rating.booking_id,
            score: rating.score,
            comment: rating.comment,
            created_at: rating.created_at.to_rfc3339(),
        }
    }
}

pub async fn ratings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RatingDto>>> {
    // 404 for unknown venues rather than an empty list
    state.service_context.venue_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

    let ratings = state.service_context.rating_repo.list_by_venue(id).await?;

    Ok(Json(ratings.into_iter().map(Into::into).collect()))
}
