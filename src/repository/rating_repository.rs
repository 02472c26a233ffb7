use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::Rating,
    error::{AppError, Result},
    repository::RatingRepository,
};

#[derive(FromRow)]
struct RatingRow {
    id: String,
    booking_id: String,
    venue_id: String,
    player_id: String,
    score: i32,
    comment: Option<String>,
    created_at: NaiveDateTime,
}

pub struct SqliteRatingRepository {
    pool: SqlitePool,
}

impl SqliteRatingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_rating(row: RatingRow) -> Result<Rating> {
        Ok(Rating {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            booking_id: Uuid::parse_str(&row.booking_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            venue_id: Uuid::parse_str(&row.venue_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            player_id: Uuid::parse_str(&row.player_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            score: row.score,
            comment: row.comment,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl RatingRepository for SqliteRatingRepository {
    async fn create(&self, rating: Rating) -> Result<Rating> {
        let id_str = rating.id.to_string();
        let booking_id_str = rating.booking_id.to_string();
        let venue_id_str = rating.venue_id.to_string();
        let player_id_str = rating.player_id.to_string();
        let created_at_naive = rating.created_at.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO ratings (
                id, booking_id, venue_id, player_id, score, comment, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&booking_id_str)
        .bind(&venue_id_str)
        .bind(&player_id_str)
        .bind(rating.score)
        .bind(&rating.comment)
        .bind(created_at_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("This booking has already been rated".to_string())
            }
            _ => AppError::Database(e.to_string()),
        })?;

        Ok(rating)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Rating>> {
        let booking_id_str = booking_id.to_string();
        let row = sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT id, booking_id, venue_id, player_id, score, comment, created_at
            FROM ratings
            WHERE booking_id = ?
            "#
        )
        .bind(booking_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_rating(r)?)),
            None => Ok(None)
        }
    }

    async fn list_by_venue(&self, venue_id: Uuid) -> Result<Vec<Rating>> {
        let venue_id_str = venue_id.to_string();
        let rows = sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT id, booking_id, venue_id, player_id, score, comment, created_at
            FROM ratings
            WHERE venue_id = ?
            ORDER BY created_at DESC
            "#
        )
        .bind(venue_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_rating).collect()
    }

    async fn average_for_owner(&self, owner_id: Uuid) -> Result<Option<f64>> {
        let owner_id_str = owner_id.to_string();
        let avg: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT AVG(CAST(r.score AS REAL))
            FROM ratings r
            JOIN venues v ON v.id = r.venue_id
            WHERE v.owner_id = ?
            "#
        )
        .bind(owner_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(avg)
    }

    async fn delete_by_booking(&self, booking_id: Uuid) -> Result<()> {
        let booking_id_str = booking_id.to_string();
        sqlx::query("DELETE FROM ratings WHERE booking_id = ?")
            .bind(&booking_id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
