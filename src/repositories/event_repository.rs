use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{is_unique_violation, Error, Result};
use crate::models::event::{Event, EventInput};

pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Creates the event when `id` is `None`, otherwise replaces the stored
    /// document with `input` merged over it. Normalization runs before any
    /// write; a failure leaves storage untouched.
    pub async fn save(&self, id: Option<Uuid>, input: &EventInput) -> Result<Event> {
        match id {
            None => self.create(input).await,
            Some(id) => self.update(id, input).await,
        }
    }

    async fn create(&self, input: &EventInput) -> Result<Event> {
        let draft = input.validate_and_normalize(None).map_err(|err| {
            warn!("Rejected new event: {} ({})", err, err.field);
            err
        })?;
        let event = Event::new(draft);

        let stored = sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, title, slug, description, overview, image, venue, location, date, time, mode, audience, agenda, organizer, tags, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING *"
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.mode)
        .bind(&event.audience)
        .bind(&event.agenda)
        .bind(&event.organizer)
        .bind(&event.tags)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|err| slug_conflict(err, &event.slug))?;

        info!("Created event {} ({})", stored.id, stored.slug);
        Ok(stored)
    }

    async fn update(&self, id: Uuid, input: &EventInput) -> Result<Event> {
        let mut tx = self.pool.begin().await?;

        let mut event = lock_event(&mut tx, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Event {}", id)))?;

        let draft = input.validate_and_normalize(Some(&event)).map_err(|err| {
            warn!("Rejected update of event {}: {} ({})", id, err, err.field);
            err
        })?;
        event.apply(draft);

        let stored = sqlx::query_as::<_, Event>(
            "UPDATE events SET title = $1, slug = $2, description = $3, overview = $4, image = $5, venue = $6, location = $7, date = $8, time = $9, mode = $10, audience = $11, agenda = $12, organizer = $13, tags = $14, updated_at = $15
             WHERE id = $16
             RETURNING *"
        )
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.mode)
        .bind(&event.audience)
        .bind(&event.agenda)
        .bind(&event.organizer)
        .bind(&event.tags)
        .bind(event.updated_at)
        .bind(event.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| slug_conflict(err, &event.slug))?;

        tx.commit().await?;

        info!("Updated event {} ({})", stored.id, stored.slug);
        Ok(stored)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(event)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        Ok(event)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events ORDER BY date ASC, time ASC, created_at ASC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    /// Deletes an event that has no bookings. Returns `false` when no such
    /// event exists.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        if lock_event(&mut tx, id).await?.is_none() {
            return Ok(false);
        }

        let (bookings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if bookings > 0 {
            warn!("Refusing to delete event {} with {} booking(s)", id, bookings);
            return Err(Error::Conflict {
                field: "bookings",
                message: format!("Event {} still has {} booking(s)", id, bookings),
            });
        }

        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Deleted event {}", id);
        Ok(true)
    }
}

async fn lock_event(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(event)
}

fn slug_conflict(err: sqlx::Error, slug: &str) -> Error {
    if is_unique_violation(&err) {
        warn!("Slug '{}' is already taken", slug);
        Error::Conflict {
            field: "slug",
            message: format!("An event with slug '{}' already exists", slug),
        }
    } else {
        err.into()
    }
}
