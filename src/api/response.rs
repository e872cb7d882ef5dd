use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::Error;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub field: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.field {
            Some(field) => json!({"error": self.message, "field": field}),
            None => json!({"error": self.message}),
        };
        (self.status, Json(body)).into_response()
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self {
                        status: rejection.status(),
                        message: rejection.body_text(),
                        field: None,
                    }
                }
            }
        )*
    };
}

impl_from_rejection!(JsonRejection, PathRejection, QueryRejection);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, field) = match &err {
            Error::Validation(v) => (StatusCode::BAD_REQUEST, Some(v.field)),
            Error::Reference(_) => (StatusCode::UNPROCESSABLE_ENTITY, Some("eventId")),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, None),
            Error::Conflict { field, .. } => (StatusCode::CONFLICT, Some(*field)),
            Error::Connection(_) | Error::Dependency(_) => (StatusCode::SERVICE_UNAVAILABLE, None),
            Error::Configuration(_) | Error::Database(_) => {
                error!("Internal error: {}", err);
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                    field: None,
                };
            }
        };

        Self {
            status,
            message: err.to_string(),
            field,
        }
    }
}
