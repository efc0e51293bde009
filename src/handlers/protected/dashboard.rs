// handlers/protected/dashboard.rs - GET /dashboard

use axum::{extract::State, response::Json};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::envelope;
use crate::pages::dashboard_page;

const OVERVIEW_KEY: &str = "/dashboard";

/// GET /dashboard - Card totals and the latest invoices
///
/// Cached for the page TTL. Invoice mutations do not revalidate it, so the
/// numbers can trail the invoice list until the entry expires.
pub async fn overview_get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if let Some(body) = state.cache.get(OVERVIEW_KEY).await {
        return Ok(Json(body));
    }

    let page = dashboard_page(state.store.as_ref(), state.config.api.latest_invoices).await?;
    let body = envelope(serde_json::to_value(page).map_err(|e| ApiError::internal_server_error(e.to_string()))?);
    state.cache.put(OVERVIEW_KEY, body.clone()).await;

    Ok(Json(body))
}
