//! Application state and the router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthProvider, CredentialsProvider, SessionCodec};
use crate::cache::PageCache;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::InvoiceStore;
use crate::handlers::{health, protected, public};
use crate::middleware::session_gate;

/// Everything a handler may touch. Cheap to clone; shared pieces sit
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvoiceStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub sessions: SessionCodec,
    pub cache: PageCache,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State backed by `store`, signing users in with the credentials
    /// provider over the same store
    pub fn new(store: Arc<dyn InvoiceStore>, config: AppConfig) -> Self {
        let sessions = SessionCodec::from_config(&config.security);
        let auth = Arc::new(CredentialsProvider::new(store.clone(), sessions.clone()));
        let cache = PageCache::new(
            Duration::from_secs(config.cache.page_ttl_secs),
            config.cache.max_entries,
        );

        Self {
            store,
            auth,
            sessions,
            cache,
            config: Arc::new(config),
        }
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = auth;
        self
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);
    let body_limit = state.config.api.max_request_size_bytes;

    let router = Router::new()
        .merge(public_routes())
        .merge(dashboard_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(state.clone(), session_gate));

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.layer(cors).with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::home))
        .route("/api/health", get(health::health))
        .route("/login", get(public::auth::login_get).post(public::auth::login_post))
}

fn dashboard_routes() -> Router<AppState> {
    use protected::{dashboard, invoices, session};

    Router::new()
        .route("/dashboard", get(dashboard::overview_get))
        .route("/dashboard/logout", post(session::logout_post))
        .route(
            "/dashboard/invoices",
            get(invoices::invoices_get).post(invoices::invoice_create),
        )
        .route("/dashboard/invoices/create", get(invoices::create_page_get))
        .route(
            "/dashboard/invoices/:id",
            post(invoices::invoice_update).delete(invoices::invoice_delete),
        )
        .route("/dashboard/invoices/:id/edit", get(invoices::edit_page_get))
        .route("/dashboard/invoices/:id/delete", post(invoices::invoice_delete))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
