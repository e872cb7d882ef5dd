use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::{response::ApiError, AppState};
use crate::error::Error;
use crate::models::event::EventInput;
use crate::repositories::{BookingRepository, EventRepository};

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListEventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.get_connection().await?;
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let events = EventRepository::new(&pool).list(limit, offset).await?;
    Ok(Json(json!(events)))
}

pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<EventInput>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.get_connection().await?;
    let event = EventRepository::new(&pool).save(None, &payload).await?;

    Ok((StatusCode::CREATED, Json(json!(event))))
}

pub async fn get_event_by_slug(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.get_connection().await?;

    match EventRepository::new(&pool).find_by_slug(&slug).await? {
        Some(event) => Ok(Json(json!(event))),
        None => Err(Error::NotFound(format!("Event '{}'", slug)).into()),
    }
}

pub async fn update_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<EventInput>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.get_connection().await?;
    let event = EventRepository::new(&pool)
        .save(Some(event_id), &payload)
        .await?;

    Ok(Json(json!(event)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.get_connection().await?;

    if EventRepository::new(&pool).delete(event_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound(format!("Event {}", event_id)).into())
    }
}

pub async fn list_event_bookings(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.get_connection().await?;

    if !EventRepository::new(&pool).exists(event_id).await? {
        return Err(Error::NotFound(format!("Event {}", event_id)).into());
    }

    let bookings = BookingRepository::new(&pool).list_by_event(event_id).await?;
    Ok(Json(json!(bookings)))
}
