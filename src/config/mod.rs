use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Read from `DATABASE_URL`; never serialized back out.
    #[serde(skip)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub items_per_page: u32,
    pub latest_invoices: u32,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached page when nothing revalidates it.
    pub page_ttl_secs: u64,
    /// Upper bound on cached pages; the oldest is evicted past it.
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub require_https: bool,
    #[serde(skip)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub session_cookie: String,
    pub sign_in_page: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("INVOICES_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ITEMS_PER_PAGE") {
            self.api.items_per_page = v.parse().unwrap_or(self.api.items_per_page);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Cache overrides
        if let Ok(v) = env::var("CACHE_PAGE_TTL_SECS") {
            self.cache.page_ttl_secs = v.parse().unwrap_or(self.cache.page_ttl_secs);
        }
        if let Ok(v) = env::var("CACHE_MAX_ENTRIES") {
            self.cache.max_entries = v.parse().unwrap_or(self.cache.max_entries);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_REQUIRE_HTTPS") {
            self.security.require_https = v.parse().unwrap_or(self.security.require_https);
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET").or_else(|_| env::var("AUTH_SECRET")) {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                items_per_page: 6,
                latest_invoices: 5,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            cache: CacheConfig {
                page_ttl_secs: 30,
                max_entries: 256,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
                require_https: false,
                jwt_secret: "development-secret-do-not-deploy".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                session_cookie: "session".to_string(),
                sign_in_page: "/login".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                items_per_page: 6,
                latest_invoices: 5,
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            cache: CacheConfig {
                page_ttl_secs: 60,
                max_entries: 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                require_https: true,
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                session_cookie: "session".to_string(),
                sign_in_page: "/login".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                items_per_page: 6,
                latest_invoices: 5,
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            cache: CacheConfig {
                page_ttl_secs: 300,
                max_entries: 4096,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                require_https: true,
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                session_cookie: "session".to_string(),
                sign_in_page: "/login".to_string(),
            },
        }
    }

    /// Development defaults without any environment lookups. Used by tests
    /// and by in-process tooling that must not depend on the caller's shell.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = "test-secret".to_string();
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
