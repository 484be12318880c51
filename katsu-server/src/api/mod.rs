//! HTTP API handlers for katsu-server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub mod auth;
pub mod authorized;
pub mod discovery;
pub mod docs;
pub mod health;
pub mod ingest;
pub mod nested;
pub mod service_info;

/// Handler-level error mapped to a JSON `{"error": ...}` response
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Database(String),
}

impl ApiError {
    pub fn db(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
