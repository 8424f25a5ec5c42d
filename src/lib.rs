//! Curio - a small item-catalog web application
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Catalog pages (HTML)                                     │
//! │  - Catalog JSON projection                                  │
//! │  - Login/logout endpoints                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Catalog reads, item writes, user directory               │
//! │  - Input sanitization, ownership policy                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx)                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers for pages, JSON, and login
//! - `service`: Business logic layer
//! - `data`: Database layer
//! - `auth`: Sessions and OAuth identity providers
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like the database pool and identity providers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// OAuth identity providers
    pub providers: Arc<auth::ProviderRegistry>,

    /// HTTP client for provider token exchange
    pub http_client: Arc<reqwest::Client>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database (runs migrations)
    /// 2. Initialize HTTP client
    /// 3. Build the provider registry from configured credentials
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Connect to SQLite database
        let db = data::Database::connect(&config.database.path).await?;
        tracing::info!("Database connected");

        // 2. Initialize HTTP client
        let http_client = Arc::new(
            reqwest::Client::builder()
                .user_agent("Curio/0.1.0")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .map_err(|e| error::AppError::Internal(e.into()))?,
        );

        // 3. Build the provider registry
        let providers = auth::ProviderRegistry::new(
            http_client.clone(),
            config.auth.google.clone(),
            config.auth.facebook.clone(),
        );

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            providers: Arc::new(providers),
            http_client,
        })
    }

    /// Initialize application state with explicit identity providers
    ///
    /// Used by tests to install providers that never touch the
    /// network.
    pub async fn with_providers(
        config: config::AppConfig,
        providers: auth::ProviderRegistry,
    ) -> Result<Self, error::AppError> {
        let db = data::Database::connect(&config.database.path).await?;
        let http_client = Arc::new(
            reqwest::Client::builder()
                .user_agent("Curio/0.1.0")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .map_err(|e| error::AppError::Internal(e.into()))?,
        );

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            providers: Arc::new(providers),
            http_client,
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::pages_router())
        .merge(api::json_router())
        .merge(api::connect_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
