use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;
use crate::database::DatabaseManager;

/// Connect with `DATABASE_URL` and apply everything under `migrations/`
pub async fn migrate(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;

    output_success(
        &output_format,
        "Database migrations applied",
        Some(json!({ "environment": config().environment })),
    )
}
