//! Database repository for events, organizers and RSVPs.
//!
//! Uses prepared statements and transactions for data integrity.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use super::is_unique_violation;
use crate::errors::AppError;
use crate::models::{Event, Organizer, Rsvp, RsvpStatus, RsvpSummary, SaveEventRequest};

/// Message returned when a guest RSVPs twice for the same event.
pub const DUPLICATE_RSVP_MESSAGE: &str = "You have already RSVP'd for this event";

const EVENT_COLUMNS: &str = "id, slug, title, subtitle, date, time, location, image, badge_text, \
     badge_color, summary, presented_by, featured, tickets_available, rsvp_link, \
     registration_opens, created_at, updated_at";

const RSVP_SELECT: &str = "SELECT r.id, r.event_id, e.slug AS event_slug, r.name, r.email, \
     r.guests, r.status, r.notes, r.created_at FROM rsvps r JOIN events e ON e.id = r.event_id";

/// Validated input for a new RSVP.
#[derive(Debug, Clone)]
pub struct NewRsvp {
    pub event_id: i64,
    pub name: String,
    /// Already normalized to lowercase
    pub email: String,
    pub guests: i64,
    pub notes: Option<String>,
}

/// Database repository for the relational data.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== EVENT OPERATIONS ====================

    /// List all events ordered by date.
    pub async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date, time, id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut organizers = self.organizers_by_event().await?;

        Ok(rows
            .iter()
            .map(|row| {
                let id: i64 = row.get("id");
                event_from_row(row, organizers.remove(&id).unwrap_or_default())
            })
            .collect())
    }

    /// Get an event by primary key.
    pub async fn get_event(&self, id: i64) -> Result<Option<Event>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let organizers = self.organizers_for(id).await?;
                Ok(Some(event_from_row(&row, organizers)))
            }
            None => Ok(None),
        }
    }

    /// Get an event by slug.
    pub async fn get_event_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug = ?");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let organizers = self.organizers_for(row.get("id")).await?;
                Ok(Some(event_from_row(&row, organizers)))
            }
            None => Ok(None),
        }
    }

    /// Resolve an event from either its slug or its numeric id.
    pub async fn find_event(&self, key: &str) -> Result<Option<Event>, AppError> {
        if let Some(event) = self.get_event_by_slug(key).await? {
            return Ok(Some(event));
        }
        match key.parse::<i64>() {
            Ok(id) => self.get_event(id).await,
            Err(_) => Ok(None),
        }
    }

    /// Create a new event together with its organizers.
    ///
    /// The request must already be normalized.
    pub async fn create_event(&self, request: &SaveEventRequest) -> Result<Event, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let result = bind_event_fields(
            sqlx::query(
                r#"INSERT INTO events (
                    slug, title, subtitle, date, time, location, image, badge_text,
                    badge_color, summary, presented_by, featured, tickets_available,
                    rsvp_link, registration_opens, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            ),
            request,
        )
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await;

        let id = match result {
            Ok(result) => result.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => return Err(slug_conflict(&request.slug)),
            Err(e) => return Err(e.into()),
        };

        insert_organizers(&mut tx, id, &request.organizers).await?;
        tx.commit().await?;

        self.get_event(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Event {} vanished after insert", id)))
    }

    /// Replace an existing event and its organizers.
    ///
    /// The request must already be normalized.
    pub async fn update_event(
        &self,
        id: i64,
        request: &SaveEventRequest,
    ) -> Result<Event, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let result = bind_event_fields(
            sqlx::query(
                r#"UPDATE events SET
                    slug = ?, title = ?, subtitle = ?, date = ?, time = ?, location = ?,
                    image = ?, badge_text = ?, badge_color = ?, summary = ?, presented_by = ?,
                    featured = ?, tickets_available = ?, rsvp_link = ?, registration_opens = ?,
                    updated_at = ?
                WHERE id = ?"#,
            ),
            request,
        )
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(result) if result.rows_affected() == 0 => {
                return Err(AppError::NotFound(format!("Event {} not found", id)));
            }
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(slug_conflict(&request.slug)),
            Err(e) => return Err(e.into()),
        }

        sqlx::query("DELETE FROM organizers WHERE event_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_organizers(&mut tx, id, &request.organizers).await?;
        tx.commit().await?;

        self.get_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    /// Delete an event by slug. Organizers and RSVPs go with it.
    pub async fn delete_event_by_slug(&self, slug: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", slug)));
        }

        Ok(())
    }

    async fn organizers_for(&self, event_id: i64) -> Result<Vec<Organizer>, AppError> {
        let rows =
            sqlx::query("SELECT name, url FROM organizers WHERE event_id = ? ORDER BY position")
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(organizer_from_row).collect())
    }

    async fn organizers_by_event(&self) -> Result<HashMap<i64, Vec<Organizer>>, AppError> {
        let rows =
            sqlx::query("SELECT event_id, name, url FROM organizers ORDER BY event_id, position")
                .fetch_all(&self.pool)
                .await?;

        let mut by_event: HashMap<i64, Vec<Organizer>> = HashMap::new();
        for row in &rows {
            by_event
                .entry(row.get("event_id"))
                .or_default()
                .push(organizer_from_row(row));
        }
        Ok(by_event)
    }

    // ==================== RSVP OPERATIONS ====================

    /// Record an RSVP, refusing a second one for the same (event, email) pair.
    pub async fn create_rsvp(&self, rsvp: &NewRsvp) -> Result<Rsvp, AppError> {
        let existing = sqlx::query("SELECT id FROM rsvps WHERE event_id = ? AND email = ?")
            .bind(rsvp.event_id)
            .bind(&rsvp.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(DUPLICATE_RSVP_MESSAGE.to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO rsvps (event_id, name, email, guests, status, notes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rsvp.event_id)
        .bind(&rsvp.name)
        .bind(&rsvp.email)
        .bind(rsvp.guests)
        .bind(RsvpStatus::Confirmed.as_str())
        .bind(&rsvp.notes)
        .bind(&now)
        .execute(&self.pool)
        .await;

        // The pre-check above races with concurrent submissions; the UNIQUE
        // constraint settles it.
        let id = match result {
            Ok(result) => result.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(DUPLICATE_RSVP_MESSAGE.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        self.get_rsvp(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("RSVP {} vanished after insert", id)))
    }

    /// Get an RSVP by ID.
    pub async fn get_rsvp(&self, id: i64) -> Result<Option<Rsvp>, AppError> {
        let sql = format!("{RSVP_SELECT} WHERE r.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(rsvp_from_row))
    }

    /// List RSVPs, newest first, optionally restricted to one event.
    pub async fn list_rsvps(&self, event_id: Option<i64>) -> Result<Vec<Rsvp>, AppError> {
        let rows = match event_id {
            Some(event_id) => {
                let sql =
                    format!("{RSVP_SELECT} WHERE r.event_id = ? ORDER BY r.created_at DESC, r.id DESC");
                sqlx::query(&sql)
                    .bind(event_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{RSVP_SELECT} ORDER BY r.created_at DESC, r.id DESC");
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        Ok(rows.iter().map(rsvp_from_row).collect())
    }

    /// Headcount of non-cancelled RSVPs for an event.
    pub async fn rsvp_summary(&self, event: &Event) -> Result<RsvpSummary, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count, COALESCE(SUM(guests), 0) AS total_guests FROM rsvps WHERE event_id = ? AND status != ?",
        )
        .bind(event.id)
        .bind(RsvpStatus::Cancelled.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(RsvpSummary {
            event_slug: event.slug.clone(),
            count: row.get("count"),
            total_guests: row.get("total_guests"),
        })
    }

    /// Change the status of an RSVP.
    pub async fn update_rsvp_status(&self, id: i64, status: RsvpStatus) -> Result<Rsvp, AppError> {
        let result = sqlx::query("UPDATE rsvps SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("RSVP {} not found", id)));
        }

        self.get_rsvp(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("RSVP {} not found", id)))
    }
}

// Helper functions for binding and row conversion

fn bind_event_fields<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    request: &'q SaveEventRequest,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&request.slug)
        .bind(&request.title)
        .bind(&request.subtitle)
        .bind(&request.date)
        .bind(&request.time)
        .bind(&request.location)
        .bind(&request.image)
        .bind(&request.badge_text)
        .bind(&request.badge_color)
        .bind(&request.summary)
        .bind(&request.presented_by)
        .bind(request.featured as i32)
        .bind(request.tickets_available as i32)
        .bind(&request.rsvp_link)
        .bind(&request.registration_opens)
}

async fn insert_organizers(
    tx: &mut Transaction<'_, Sqlite>,
    event_id: i64,
    organizers: &[Organizer],
) -> Result<(), AppError> {
    for (position, organizer) in organizers.iter().enumerate() {
        sqlx::query("INSERT INTO organizers (event_id, position, name, url) VALUES (?, ?, ?, ?)")
            .bind(event_id)
            .bind(position as i64)
            .bind(&organizer.name)
            .bind(&organizer.url)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

fn slug_conflict(slug: &str) -> AppError {
    AppError::Conflict(format!("An event with slug '{}' already exists", slug))
}

fn organizer_from_row(row: &SqliteRow) -> Organizer {
    Organizer {
        name: row.get("name"),
        url: row.get("url"),
    }
}

fn event_from_row(row: &SqliteRow, organizers: Vec<Organizer>) -> Event {
    let featured: i32 = row.get("featured");
    let tickets_available: i32 = row.get("tickets_available");
    Event {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        date: row.get("date"),
        time: row.get("time"),
        location: row.get("location"),
        image: row.get("image"),
        badge_text: row.get("badge_text"),
        badge_color: row.get("badge_color"),
        summary: row.get("summary"),
        presented_by: row.get("presented_by"),
        organizers,
        featured: featured != 0,
        tickets_available: tickets_available != 0,
        rsvp_link: row.get("rsvp_link"),
        registration_opens: row.get("registration_opens"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn rsvp_from_row(row: &SqliteRow) -> Rsvp {
    let status: String = row.get("status");
    Rsvp {
        id: row.get("id"),
        event_id: row.get("event_id"),
        event_slug: row.get("event_slug"),
        name: row.get("name"),
        email: row.get("email"),
        guests: row.get("guests"),
        status: status.parse().unwrap_or_default(),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    }
}
