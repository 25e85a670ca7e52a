//! # CLI
//!
//! Command-line interface: run the server, assess one child, print or
//! check reference tables.
//!
//! Each `cmd_*` function prints its output and returns `Err` on any
//! failure so `main` can set the exit code. The `render_*` functions
//! build the same output without printing.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stunting_core::assessment::DATE_FORMAT;
use stunting_core::report::{render_table, render_text};
use stunting_core::{
    AssessmentError, AssessmentRequest, GrowthAssessor, HeightValue, ReferenceError, Sex,
    ValidationErrors,
};
use thiserror::Error;

use crate::api::{self, ServerError};
use crate::config::{
    self, ConfigError, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_RATE_LIMIT, ServerConfig,
};

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "stunting", version, about = "Height-for-age (stunting) calculator")]
pub struct Cli {
    /// Tracing filter, overridden by RUST_LOG.
    #[arg(long, global = true, env = "STUNTING_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Assess a single child.
    Assess(AssessArgs),
    /// Print reference values for a sex.
    Standards(StandardsArgs),
    /// Validate a custom reference dataset file.
    Check {
        /// Dataset JSON file.
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "STUNTING_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "STUNTING_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Custom reference dataset (JSON). Defaults to the embedded WHO table.
    #[arg(long, env = "STUNTING_STANDARDS")]
    pub standards: Option<PathBuf>,

    /// Requests per second across all clients (0 disables).
    #[arg(long, env = "STUNTING_RATE_LIMIT", default_value_t = DEFAULT_RATE_LIMIT)]
    pub rate_limit: u32,

    /// Require `Authorization: Bearer <key>` on /api routes.
    #[arg(long, env = "STUNTING_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Allowed CORS origin (repeatable, or comma-separated in the env var).
    #[arg(long = "cors-origin", env = "STUNTING_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            standards_path: args.standards,
            rate_limit_per_second: args.rate_limit,
            api_key: args.api_key.filter(|k| !k.is_empty()),
            cors_origins: args.cors_origins,
        }
    }
}

#[derive(Debug, Args)]
pub struct AssessArgs {
    /// boys | girls (also male/female, L/P)
    #[arg(long)]
    pub gender: String,

    /// Height in centimetres.
    #[arg(long)]
    pub height: String,

    /// Birth date, YYYY-MM-DD.
    #[arg(long)]
    pub birth_date: String,

    /// Reference date, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub today: Option<String>,

    /// Custom reference dataset (JSON). Defaults to the embedded WHO table.
    #[arg(long, env = "STUNTING_STANDARDS")]
    pub standards: Option<PathBuf>,

    /// Print JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct StandardsArgs {
    #[arg(long)]
    pub gender: String,

    /// Single age in months (interpolated/clamped). Omit for the whole table.
    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long, env = "STUNTING_STANDARDS")]
    pub standards: Option<PathBuf>,

    #[arg(long)]
    pub json: bool,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("invalid reference dataset: {0}")]
    Reference(#[from] ReferenceError),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("{0}")]
    InvalidGender(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AssessmentError> for CliError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::Validation(errors) => CliError::Validation(errors),
            AssessmentError::Reference(e) => CliError::Reference(e),
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Run a parsed command to completion.
pub async fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Serve(args) => api::serve(args.into()).await?,
        Command::Assess(args) => cmd_assess(
            args.standards.as_deref(),
            &args.gender,
            &args.height,
            &args.birth_date,
            args.today.as_deref(),
            args.json,
        )?,
        Command::Standards(args) => {
            cmd_standards(args.standards.as_deref(), &args.gender, args.age, args.json)?;
        }
        Command::Check { path } => cmd_check(&path)?,
    }
    Ok(())
}

// =============================================================================
// COMMANDS
// =============================================================================

fn parse_today(today: Option<&str>) -> Result<NaiveDate, CliError> {
    match today {
        None => Ok(config::today()),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map_err(|_| CliError::InvalidDate(raw.to_string())),
    }
}

/// Assess one child and return the rendered output.
pub fn render_assess(
    standards: Option<&Path>,
    gender: &str,
    height: &str,
    birth_date: &str,
    today: Option<&str>,
    json: bool,
) -> Result<String, CliError> {
    let today = parse_today(today)?;
    let table = config::load_standards(standards)?;
    let assessor = GrowthAssessor::new(Arc::new(table));

    let request = AssessmentRequest::new(gender, HeightValue::Text(height.to_string()), birth_date);
    let result = assessor.assess_request(&request, today)?;

    if json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(render_text(&result))
    }
}

/// Assess one child and print the report.
pub fn cmd_assess(
    standards: Option<&Path>,
    gender: &str,
    height: &str,
    birth_date: &str,
    today: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    match render_assess(standards, gender, height, birth_date, today, json) {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(CliError::Validation(errors)) => {
            for e in errors.iter() {
                eprintln!("  {}: {}", e.field, e.message);
            }
            Err(CliError::Validation(errors))
        }
        Err(e) => Err(e),
    }
}

/// Render reference values for one sex, either one age or the full table.
pub fn render_standards(
    standards: Option<&Path>,
    gender: &str,
    age: Option<u32>,
    json: bool,
) -> Result<String, CliError> {
    let sex: Sex = gender
        .parse()
        .map_err(|e: stunting_core::ParseSexError| CliError::InvalidGender(e.to_string()))?;
    let table = config::load_standards(standards)?;

    match age {
        Some(age) => {
            let lookup = table.lookup(sex, age)?;
            if json {
                return Ok(serde_json::to_string_pretty(&lookup)?);
            }
            let mut output = format!("{} at {} months", sex.label(), age);
            if lookup.clamped {
                output.push_str(&format!(" (clamped to {} months)", lookup.table_age_months));
            } else if lookup.interpolated {
                output.push_str(" (interpolated)");
            }
            output.push('\n');
            for (name, value) in lookup.columns.iter() {
                output.push_str(&format!(
                    "{:>7}: {:.1} cm\n",
                    stunting_core::report::column_label(name),
                    value
                ));
            }
            Ok(output)
        }
        None => {
            let rows: Vec<_> = table.rows(sex).collect();
            if json {
                return Ok(serde_json::to_string_pretty(&rows)?);
            }
            Ok(format!("{} ({}, cm)\n{}", table.indicator(), sex.label(), render_table(&rows)))
        }
    }
}

/// Print reference values.
pub fn cmd_standards(standards: Option<&Path>, gender: &str, age: Option<u32>, json: bool) -> Result<(), CliError> {
    let output = render_standards(standards, gender, age, json)?;
    println!("{output}");
    Ok(())
}

/// Load a dataset file and report its coverage.
pub fn cmd_check(path: &Path) -> Result<(), CliError> {
    let table = config::load_standards(Some(path))?;
    println!("{}: OK ({} rows, indicator {})", path.display(), table.len(), table.indicator());
    for sex in Sex::ALL {
        if let Some((first, last)) = table.age_range(sex) {
            println!("  {}: {}-{} months", sex.label(), first, last);
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
