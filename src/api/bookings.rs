use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::extract::{ApiJson, ApiPath};
use crate::api::{response::ApiError, AppState};
use crate::models::booking::BookingInput;
use crate::repositories::BookingRepository;

pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BookingInput>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.get_connection().await?;
    let booking = BookingRepository::new(&pool).save(None, &payload).await?;

    Ok((StatusCode::CREATED, Json(json!(booking))))
}

pub async fn update_booking(
    State(state): State<AppState>,
    ApiPath(booking_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BookingInput>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.get_connection().await?;
    let booking = BookingRepository::new(&pool)
        .save(Some(booking_id), &payload)
        .await?;

    Ok(Json(json!(booking)))
}
