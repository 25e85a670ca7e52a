//! # Configuration
//!
//! Server settings, reference dataset loading and tracing setup.
//!
//! Settings come from `serve` flags, each backed by a `STUNTING_*`
//! environment variable (see [`crate::cli::ServeArgs`]). File I/O for
//! custom datasets lives here so that `stunting-core` stays pure.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use stunting_core::{ReferenceError, StandardsTable};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "stunting=info,tower_http=info";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Requests per second across all clients. 0 disables limiting.
pub const DEFAULT_RATE_LIMIT: u32 = 50;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read reference dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reference dataset: {0}")]
    Reference(#[from] ReferenceError),

    #[error("invalid CORS origin '{0}'")]
    InvalidOrigin(String),
}

// =============================================================================
// SERVER CONFIG
// =============================================================================

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Custom dataset; `None` uses the embedded WHO table.
    pub standards_path: Option<PathBuf>,
    pub rate_limit_per_second: u32,
    /// When set, `/api` routes require `Authorization: Bearer <key>`.
    pub api_key: Option<String>,
    /// Allowed browser origins; empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            standards_path: None,
            rate_limit_per_second: DEFAULT_RATE_LIMIT,
            api_key: None,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// DATASET LOADING
// =============================================================================

/// Load a reference dataset from `path`, or the embedded WHO table.
pub fn load_standards(path: Option<&Path>) -> Result<StandardsTable, ConfigError> {
    let Some(path) = path else {
        return Ok(StandardsTable::who_default()?);
    };

    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(StandardsTable::from_json_str(&json)?)
}

/// Human-readable name of the dataset source, for logs.
#[must_use]
pub fn standards_source(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| String::from("embedded WHO 0-60 months"))
}

// =============================================================================
// CLOCK & TRACING
// =============================================================================

/// Local calendar date, the reference date for assessments.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Calling twice is harmless.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

// =============================================================================
// TESTS
// =============================================================================
