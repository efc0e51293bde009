use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use invoice_dashboard::config::config;
use invoice_dashboard::database::{DatabaseManager, PgInvoiceStore};
use invoice_dashboard::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("invoice_dashboard=info,tower_http=info")),
        )
        .init();

    let config = config();
    info!("Starting invoice dashboard in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("no session secret configured; set AUTH_SECRET or SECURITY_JWT_SECRET");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    let store = Arc::new(PgInvoiceStore::new(pool));
    let state = AppState::new(store, config.clone());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Invoice dashboard listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
