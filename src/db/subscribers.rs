//! Mailing-list subscriber store.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::is_unique_violation;
use crate::errors::AppError;
use crate::models::Subscriber;

/// Message returned when an address is already on the list.
pub const DUPLICATE_SUBSCRIBER_MESSAGE: &str = "This email is already subscribed";

/// Store for subscriber documents. Emails are unique regardless of case.
#[derive(Clone)]
pub struct SubscriberStore {
    pool: SqlitePool,
}

impl SubscriberStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List subscribers, newest first.
    pub async fn list(&self) -> Result<Vec<Subscriber>, AppError> {
        let rows = sqlx::query(
            "SELECT id, email, name, created_at, updated_at FROM subscribers ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(subscriber_from_row).collect())
    }

    /// Add a subscriber. `email` must already be normalized.
    pub async fn create(&self, email: &str, name: Option<&str>) -> Result<Subscriber, AppError> {
        let existing = sqlx::query("SELECT id FROM subscribers WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(DUPLICATE_SUBSCRIBER_MESSAGE.to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO subscribers (id, email, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Subscriber {
                id,
                email: email.to_string(),
                name: name.map(str::to_string),
                created_at: now.clone(),
                updated_at: now,
            }),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
                DUPLICATE_SUBSCRIBER_MESSAGE.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a subscriber by ID.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Subscriber {} not found", id)));
        }

        Ok(())
    }
}

fn subscriber_from_row(row: &SqliteRow) -> Subscriber {
    Subscriber {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
