use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::normalize_email;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub event_id: Option<Uuid>,
    pub email: Option<String>,
}

/// Booking fields after the required checks, with the email normalized but
/// not yet pattern-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub event_id: Uuid,
    pub email: String,
    pub event_changed: bool,
}

impl BookingInput {
    pub fn resolve(&self, existing: Option<&Booking>) -> Result<BookingDraft, ValidationError> {
        let event_id = self
            .event_id
            .or(existing.map(|b| b.event_id))
            .ok_or_else(|| ValidationError::required("eventId"))?;

        let email = self
            .email
            .as_deref()
            .or(existing.map(|b| b.email.as_str()))
            .map(normalize_email)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| ValidationError::required("email"))?;

        Ok(BookingDraft {
            event_id,
            email,
            event_changed: existing.map_or(true, |b| b.event_id != event_id),
        })
    }
}

impl Booking {
    pub fn new(event_id: Uuid, email: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            event_id,
            email,
            created_at: now,
            updated_at: now,
        }
    }
}
