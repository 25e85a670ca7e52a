//! # HTTP API
//!
//! axum server exposing the calculator to the village website.
//!
//! ```text
//! GET  /health
//! POST /api/stunting/assess
//! GET  /api/stunting/standards/{gender}
//! GET  /api/stunting/standards/{gender}/{age_months}
//! ```
//!
//! Layers (outermost first): trace → CORS → rate limit → API key (`/api` only).
//! The reference table is loaded once and shared through [`AppState`].

pub mod error;
pub mod handlers;
pub mod middleware;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use chrono::NaiveDate;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use stunting_core::{GrowthAssessor, StandardsTable};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{self, ConfigError, ServerConfig};

// =============================================================================
// STATE
// =============================================================================

/// Shared, cheaply clonable handler state.
#[derive(Clone)]
pub struct AppState {
    pub assessor: GrowthAssessor,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    api_key: Option<Arc<str>>,
    cors_origins: Arc<[HeaderValue]>,
    fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(table: Arc<StandardsTable>, config: &ServerConfig) -> Result<Self, ConfigError> {
        let limiter = NonZeroU32::new(config.rate_limit_per_second)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        let cors_origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            assessor: GrowthAssessor::new(table),
            limiter,
            api_key: config.api_key.as_deref().map(Arc::from),
            cors_origins: cors_origins.into(),
            fixed_today: None,
        })
    }

    /// Pin the reference date instead of reading the local clock.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// Reference date for assessments.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(config::today)
    }

    fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.is_empty() {
            return CorsLayer::permissive();
        }
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.cors_origins.iter().cloned()))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/stunting/assess", post(handlers::assess))
        .route("/stunting/standards/{gender}", get(handlers::standards_table))
        .route(
            "/stunting/standards/{gender}/{age_months}",
            get(handlers::standards_at),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(state.cors_layer()),
        )
        .with_state(state)
}

// =============================================================================
// SERVER
// =============================================================================

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the dataset, bind and serve until Ctrl-C / SIGTERM.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let table = config::load_standards(config.standards_path.as_deref())?;
    info!(
        source = %config::standards_source(config.standards_path.as_deref()),
        indicator = table.indicator(),
        rows = table.len(),
        "reference table loaded"
    );

    let state = AppState::new(Arc::new(table), &config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        rate_limit = config.rate_limit_per_second,
        auth = config.api_key.is_some(),
        "stunting calculator listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}

// =============================================================================
// TESTS
// =============================================================================
