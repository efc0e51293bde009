// handlers/public/mod.rs - Pages anyone may see
//
// Signed-in users never get here: the gate sends them to the dashboard.

pub mod auth;

use serde_json::json;

use crate::middleware::ApiResponse;

/// GET / - Landing page
pub async fn home() -> ApiResponse<serde_json::Value> {
    ApiResponse::success(json!({
        "name": "Acme Invoices",
        "version": env!("CARGO_PKG_VERSION"),
        "links": {
            "login": "/login"
        }
    }))
}
