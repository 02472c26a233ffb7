use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Venue, CreateVenueRequest, UpdateVenueRequest},
    error::{AppError, Result},
    repository::VenueRepository,
};

const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(FromRow)]
struct VenueRow {
    id: String,
    owner_id: String,
    name: String,
    location: String,
    sport: String,
    price_per_hour_cents: i64,
    max_players: i32,
    open_time: Option<String>,
    close_time: Option<String>,
    description: String,
    maps_link: Option<String>,
    image_url: Option<String>,
    amenities: String,
    custom_amenities: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteVenueRepository {
    pool: SqlitePool,
}

const SELECT_VENUE: &str = r#"
    SELECT id, owner_id, name, location, sport, price_per_hour_cents,
           max_players, open_time, close_time, description, maps_link,
           image_url, amenities, custom_amenities, created_at, updated_at
    FROM venues
"#;

impl SqliteVenueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_venue(row: VenueRow) -> Result<Venue> {
        Ok(Venue {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            owner_id: Uuid::parse_str(&row.owner_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            location: row.location,
            sport: row.sport,
            price_per_hour_cents: row.price_per_hour_cents,
            max_players: row.max_players,
            open_time: row.open_time.as_deref().map(Self::parse_time).transpose()?,
            close_time: row.close_time.as_deref().map(Self::parse_time).transpose()?,
            description: row.description,
            maps_link: row.maps_link,
            image_url: row.image_url,
            amenities: Self::parse_tags(&row.amenities)?,
            custom_amenities: Self::parse_tags(&row.custom_amenities)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_time(s: &str) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(s, TIME_FORMAT)
            .map_err(|e| AppError::Database(format!("Invalid time value '{}': {}", s, e)))
    }

    fn time_to_str(t: &NaiveTime) -> String {
        t.format(TIME_FORMAT).to_string()
    }

    fn parse_tags(s: &str) -> Result<Vec<String>> {
        serde_json::from_str(s)
            .map_err(|e| AppError::Database(format!("Invalid amenities value: {}", e)))
    }

    fn tags_to_str(tags: &[String]) -> Result<String> {
        serde_json::to_string(tags)
            .map_err(|e| AppError::Database(format!("Failed to encode amenities: {}", e)))
    }
}

#[async_trait]
impl VenueRepository for SqliteVenueRepository {
    async fn create(&self, owner_id: Uuid, request: CreateVenueRequest) -> Result<Venue> {
        let id = Uuid::new_v4();
        let now_naive = Utc::now().naive_utc();

        let id_str = id.to_string();
        let owner_id_str = owner_id.to_string();
        let open_str = request.open_time.as_ref().map(Self::time_to_str);
        let close_str = request.close_time.as_ref().map(Self::time_to_str);
        let amenities_str = Self::tags_to_str(&request.amenities)?;
        let custom_str = Self::tags_to_str(&request.custom_amenities)?;

        sqlx::query(
            r#"
            INSERT INTO venues (
                id, owner_id, name, location, sport, price_per_hour_cents,
                max_players, open_time, close_time, description, maps_link,
                image_url, amenities, custom_amenities, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&owner_id_str)
        .bind(&request.name)
        .bind(&request.location)
        .bind(&request.sport)
        .bind(request.price_per_hour_cents)
        .bind(request.max_players)
        .bind(&open_str)
        .bind(&close_str)
        .bind(&request.description)
        .bind(&request.maps_link)
        .bind(&request.image_url)
        .bind(&amenities_str)
        .bind(&custom_str)
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created venue".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Venue>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, VenueRow>(
            &format!("{} WHERE id = ?", SELECT_VENUE)
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_venue(r)?)),
            None => Ok(None)
        }
    }

    async fn list(&self) -> Result<Vec<Venue>> {
        let rows = sqlx::query_as::<_, VenueRow>(
            &format!("{} ORDER BY name", SELECT_VENUE)
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_venue).collect()
    }

    async fn list_by_sport(&self, sport: &str) -> Result<Vec<Venue>> {
        let rows = sqlx::query_as::<_, VenueRow>(
            &format!("{} WHERE sport = ? ORDER BY name", SELECT_VENUE)
        )
        .bind(sport)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_venue).collect()
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Venue>> {
        let owner_id_str = owner_id.to_string();
        let rows = sqlx::query_as::<_, VenueRow>(
            &format!("{} WHERE owner_id = ? ORDER BY name", SELECT_VENUE)
        )
        .bind(owner_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_venue).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateVenueRequest) -> Result<Venue> {
        let existing = self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))?;

        let id_str = id.to_string();
        let now_naive = Utc::now().naive_utc();

        let open_str = update.open_time.or(existing.open_time)
            .as_ref().map(Self::time_to_str);
        let close_str = update.close_time.or(existing.close_time)
            .as_ref().map(Self::time_to_str);
        let amenities_str = match &update.amenities {
            Some(tags) => Some(Self::tags_to_str(tags)?),
            None => None,
        };
        let custom_str = match &update.custom_amenities {
            Some(tags) => Some(Self::tags_to_str(tags)?),
            None => None,
        };

        sqlx::query(
            r#"
            UPDATE venues
            SET name = COALESCE(?, name),
                location = COALESCE(?, location),
                sport = COALESCE(?, sport),
                price_per_hour_cents = COALESCE(?, price_per_hour_cents),
                max_players = COALESCE(?, max_players),
                open_time = ?,
                close_time = ?,
                description = COALESCE(?, description),
                maps_link = COALESCE(?, maps_link),
                image_url = COALESCE(?, image_url),
                amenities = COALESCE(?, amenities),
                custom_amenities = COALESCE(?, custom_amenities),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.name)
        .bind(&update.location)
        .bind(&update.sport)
        .bind(update.price_per_hour_cents)
        .bind(update.max_players)
        .bind(&open_str)
        .bind(&close_str)
        .bind(&update.description)
        .bind(&update.maps_link)
        .bind(&update.image_url)
        .bind(&amenities_str)
        .bind(&custom_str)
        .bind(now_naive)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated venue".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM venues WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
