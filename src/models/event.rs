use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::{non_empty_list, normalize_date, normalize_time, required_text, slugify};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "event_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    Online,
    Offline,
    Hybrid,
}

impl FromStr for EventMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(EventMode::Online),
            "offline" => Ok(EventMode::Offline),
            "hybrid" => Ok(EventMode::Hybrid),
            _ => Err(ValidationError::new(
                "mode",
                "mode must be one of online, offline, hybrid",
            )),
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventMode::Online => "online",
            EventMode::Offline => "offline",
            EventMode::Hybrid => "hybrid",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,

    /// Always `YYYY-MM-DD`.
    pub date: String,

    /// Always `HH:MM`, 24-hour.
    pub time: String,

    pub mode: EventMode,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied event fields. On update, `None` leaves the stored value
/// untouched and skips that field's normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub image: Option<String>,
    pub venue: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub mode: Option<String>,
    pub audience: Option<String>,
    pub agenda: Option<Vec<String>>,
    pub organizer: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A fully validated event, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

impl EventInput {
    /// Merges the supplied fields over `existing` (if any), checks field
    /// constraints, then derives the slug, date and time in that order.
    /// Stops at the first violation.
    pub fn validate_and_normalize(&self, existing: Option<&Event>) -> Result<EventDraft, ValidationError> {
        let text = |field: &'static str, supplied: &Option<String>, stored: Option<&String>| {
            required_text(field, supplied.as_deref().or(stored.map(String::as_str)))
        };

        let title = text("title", &self.title, existing.map(|e| &e.title))?;
        let description = text("description", &self.description, existing.map(|e| &e.description))?;
        let overview = text("overview", &self.overview, existing.map(|e| &e.overview))?;
        let image = text("image", &self.image, existing.map(|e| &e.image))?;
        let venue = text("venue", &self.venue, existing.map(|e| &e.venue))?;
        let location = text("location", &self.location, existing.map(|e| &e.location))?;
        let audience = text("audience", &self.audience, existing.map(|e| &e.audience))?;
        let organizer = text("organizer", &self.organizer, existing.map(|e| &e.organizer))?;

        let mode = match (&self.mode, existing) {
            (Some(mode), _) => required_text("mode", Some(mode.as_str()))?.parse()?,
            (None, Some(e)) => e.mode,
            (None, None) => return Err(ValidationError::required("mode")),
        };

        let agenda = non_empty_list(
            "agenda",
            self.agenda.as_deref().or(existing.map(|e| e.agenda.as_slice())),
        )?;
        let tags = non_empty_list(
            "tags",
            self.tags.as_deref().or(existing.map(|e| e.tags.as_slice())),
        )?;

        let title_changed = existing.map_or(true, |e| e.title != title);
        let slug = match (title_changed, &self.slug, existing) {
            (true, _, _) | (false, None, None) => {
                let slug = slugify(&title);
                if slug.is_empty() {
                    return Err(ValidationError::new(
                        "slug",
                        "title must contain at least one letter or digit",
                    ));
                }
                slug
            }
            // Overrides go through the same derivation so stored slugs keep one shape.
            (false, Some(supplied), _) => {
                let slug = slugify(supplied);
                if slug.is_empty() {
                    return Err(ValidationError::new(
                        "slug",
                        "slug must contain at least one letter or digit",
                    ));
                }
                slug
            }
            (false, None, Some(e)) => e.slug.clone(),
        };

        let date = match (&self.date, existing) {
            (Some(date), _) => normalize_date(date)?,
            (None, Some(e)) => e.date.clone(),
            (None, None) => return Err(ValidationError::required("date")),
        };

        let time = match (&self.time, existing) {
            (Some(time), _) => normalize_time(time)?,
            (None, Some(e)) => e.time.clone(),
            (None, None) => return Err(ValidationError::required("time")),
        };

        Ok(EventDraft {
            title,
            slug,
            description,
            overview,
            image,
            venue,
            location,
            date,
            time,
            mode,
            audience,
            agenda,
            organizer,
            tags,
        })
    }
}

impl Event {
    pub fn new(draft: EventDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            overview: draft.overview,
            image: draft.image,
            venue: draft.venue,
            location: draft.location,
            date: draft.date,
            time: draft.time,
            mode: draft.mode,
            audience: draft.audience,
            agenda: draft.agenda,
            organizer: draft.organizer,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every user field with the draft's, keeping identity and
    /// creation time.
    pub fn apply(&mut self, draft: EventDraft) {
        self.title = draft.title;
        self.slug = draft.slug;
        self.description = draft.description;
        self.overview = draft.overview;
        self.image = draft.image;
        self.venue = draft.venue;
        self.location = draft.location;
        self.date = draft.date;
        self.time = draft.time;
        self.mode = draft.mode;
        self.audience = draft.audience;
        self.agenda = draft.agenda;
        self.organizer = draft.organizer;
        self.tags = draft.tags;
        self.updated_at = Utc::now();
    }
}
