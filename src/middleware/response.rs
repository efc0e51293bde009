use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response (200 OK)
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

/// Wrap an already-serialized page body in the success envelope
pub fn envelope(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        (StatusCode::OK, Json(envelope(data_value))).into_response()
    }
}

/// How a handler finished. Redirects and not-found are ordinary values the
/// caller has to match on, not early exits.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Redirect(String),
    NotFound,
}

impl<T> Outcome<T> {
    pub fn redirect(path: impl Into<String>) -> Self {
        Outcome::Redirect(path.into())
    }
}

impl<T: IntoResponse> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Success(value) => value.into_response(),
            // 303 so the browser follows a form POST with a GET
            Outcome::Redirect(path) => Redirect::to(&path).into_response(),
            Outcome::NotFound => {
                crate::error::ApiError::not_found("404 Not Found").into_response()
            }
        }
    }
}
