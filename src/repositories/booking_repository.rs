use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::booking::{Booking, BookingInput};
use crate::validation::validate_email;

pub struct BookingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Creates the booking when `id` is `None`, otherwise updates it.
    ///
    /// Whenever the event reference is new or changed the referenced event
    /// must exist; its row is share-locked until the booking is written so it
    /// cannot be deleted in between.
    pub async fn save(&self, id: Option<Uuid>, input: &BookingInput) -> Result<Booking> {
        let mut tx = self.pool.begin().await?;

        let existing = match id {
            Some(id) => Some(
                sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("Booking {}", id)))?,
            ),
            None => None,
        };

        let draft = input.resolve(existing.as_ref())?;

        if draft.event_changed {
            ensure_event_facility(&mut tx).await?;
            ensure_event_exists(&mut tx, draft.event_id).await?;
        }

        validate_email(&draft.email).map_err(|err| {
            warn!("Rejected booking for event {}: {}", draft.event_id, err);
            err
        })?;

        let stored = match existing {
            None => {
                let booking = Booking::new(draft.event_id, draft.email);
                sqlx::query_as::<_, Booking>(
                    "INSERT INTO bookings (id, event_id, email, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING *"
                )
                .bind(booking.id)
                .bind(booking.event_id)
                .bind(&booking.email)
                .bind(booking.created_at)
                .bind(booking.updated_at)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(booking) => {
                sqlx::query_as::<_, Booking>(
                    "UPDATE bookings SET event_id = $1, email = $2, updated_at = $3 WHERE id = $4 RETURNING *"
                )
                .bind(draft.event_id)
                .bind(&draft.email)
                .bind(Utc::now())
                .bind(booking.id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;

        info!("Saved booking {} for event {}", stored.id, stored.event_id);
        Ok(stored)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE event_id = $1 ORDER BY created_at ASC"
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn count_by_event(&self, event_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

async fn ensure_event_facility(tx: &mut Transaction<'_, Postgres>) -> Result<()> {
    let available: bool = sqlx::query_scalar("SELECT to_regclass('events') IS NOT NULL")
        .fetch_one(&mut **tx)
        .await?;

    if !available {
        error!("events table is missing; bookings cannot be validated");
        return Err(Error::Dependency(
            "Event model not found. Please ensure the events table is migrated.".to_string(),
        ));
    }

    Ok(())
}

async fn ensure_event_exists(tx: &mut Transaction<'_, Postgres>, event_id: Uuid) -> Result<()> {
    let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM events WHERE id = $1 FOR SHARE")
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|err| {
            error!("Failed to validate event {}: {}", event_id, err);
            err
        })?;

    if found.is_none() {
        warn!("Rejected booking for missing event {}", event_id);
        return Err(Error::Reference(event_id));
    }

    Ok(())
}
