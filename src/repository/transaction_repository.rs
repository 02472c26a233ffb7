use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Transaction, TransactionStatus},
    error::{AppError, Result},
    repository::TransactionRepository,
};

#[derive(FromRow)]
struct TransactionRow {
    id: String,
    booking_id: String,
    amount_cents: i64,
    status: String,
    created_at: NaiveDateTime,
}

pub struct SqliteTransactionRepository {
    pool: SqlitePool,
}

impl SqliteTransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_transaction(row: TransactionRow) -> Result<Transaction> {
        Ok(Transaction {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            booking_id: Uuid::parse_str(&row.booking_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            amount_cents: row.amount_cents,
            status: Self::parse_status(&row.status)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<TransactionStatus> {
        match s {
            "Pending" => Ok(TransactionStatus::Pending),
            "Completed" => Ok(TransactionStatus::Completed),
            "Failed" => Ok(TransactionStatus::Failed),
            _ => Err(AppError::Database(format!("Invalid transaction status: {}", s))),
        }
    }

    fn status_to_str(status: &TransactionStatus) -> &'static str {
        match status {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Failed => "Failed",
        }
    }
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepository {
    async fn create(&self, transaction: Transaction) -> Result<Transaction> {
        let id_str = transaction.id.to_string();
        let booking_id_str = transaction.booking_id.to_string();
        let status_str = Self::status_to_str(&transaction.status);
        let created_at_naive = transaction.created_at.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO transactions (id, booking_id, amount_cents, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&booking_id_str)
        .bind(transaction.amount_cents)
        .bind(status_str)
        .bind(created_at_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(transaction)
    }

    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<Transaction>> {
        let booking_id_str = booking_id.to_string();
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, booking_id, amount_cents, status, created_at
            FROM transactions
            WHERE booking_id = ?
            ORDER BY created_at DESC
            "#
        )
        .bind(booking_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_transaction).collect()
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let owner_id_str = owner_id.to_string();
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT t.id, t.booking_id, t.amount_cents, t.status, t.created_at
            FROM transactions t
            JOIN bookings b ON b.id = t.booking_id
            JOIN venues v ON v.id = b.venue_id
            WHERE v.owner_id = ?
            ORDER BY t.created_at DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(owner_id_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_transaction).collect()
    }

    async fn delete_by_booking(&self, booking_id: Uuid) -> Result<()> {
        let booking_id_str = booking_id.to_string();
        sqlx::query("DELETE FROM transactions WHERE booking_id = ?")
            .bind(&booking_id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
