use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub location: String,
    pub sport: String,
    pub price_per_hour_cents: i64,
    pub max_players: i32,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    pub description: String,
    pub maps_link: Option<String>,
    pub image_url: Option<String>,
    pub amenities: Vec<String>,
    pub custom_amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVenueRequest {
    pub name: String,
    pub location: String,
    pub sport: String,
    pub price_per_hour_cents: i64,
    #[serde(default)]
    pub max_players: i32,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    #[serde(default)]
    pub description: String,
    pub maps_link: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub custom_amenities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateVenueRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub sport: Option<String>,
    pub price_per_hour_cents: Option<i64>,
    pub max_players: Option<i32>,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub maps_link: Option<String>,
    pub image_url: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub custom_amenities: Option<Vec<String>>,
}
