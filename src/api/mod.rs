pub mod bookings;
pub mod events;
pub mod extract;
pub mod health;
pub mod response;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub fn build_router(db: Arc<Database>) -> Router {
    let state = AppState { db };

    Router::new()
        .route("/health", get(health::health_check))
        .route("/events", get(events::list_events).post(events::create_event))
        // GET resolves by slug; PUT and DELETE address the event id.
        .route(
            "/events/{key}",
            get(events::get_event_by_slug)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/{key}/bookings", get(events::list_event_bookings))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/{id}", put(bookings::update_booking))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::PgConnector;

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn unconnected_state() -> Arc<Database> {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost:1/unused".to_string()),
            _ => None,
        })
        .unwrap();
        Arc::new(Database::new(PgConnector::new(&config)))
    }

    #[tokio::test]
    async fn test_health_does_not_connect() {
        let app = build_router(unconnected_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_booking_id_is_rejected() {
        let app = build_router(unconnected_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/bookings/not-a-uuid")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"email":"a@b.co"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_json_renders_error_body() {
        let app = build_router(unconnected_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/bookings")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"email": "#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("JSON"));
    }

    #[tokio::test]
    async fn test_mistyped_field_renders_error_body() {
        let app = build_router(unconnected_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/events")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title": 42}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_bad_query_renders_error_body() {
        let app = build_router(unconnected_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/events?limit=lots")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }
}
