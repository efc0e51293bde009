// handlers/health.rs - GET /api/health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::middleware::ApiResponse;

/// GET /api/health - Database ping
///
/// Outside the session gate by path. Answers 503 while the database is
/// unreachable.
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok"
        }))
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        )
            .into_response(),
    }
}
