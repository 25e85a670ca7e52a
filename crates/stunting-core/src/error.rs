//! # Error Types
//!
//! Two failure families exist:
//!
//! - [`ValidationErrors`]: the caller sent unusable input. Every failing
//!   field is reported at once, keyed by [`Field`].
//! - [`ReferenceError`]: the reference dataset is malformed. This is an
//!   internal failure; no fabricated result is ever produced from it.
//!
//! Ages outside the tabulated domain are NOT errors. They clamp to the
//! boundary row (see [`crate::standards::StandardsTable::lookup`]).

use crate::Sex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// VALIDATION
// =============================================================================

/// Input field names, matching the request payload keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Gender,
    Height,
    BirthDate,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Gender => "gender",
            Field::Height => "height",
            Field::BirthDate => "birth_date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// All constraint failures for one request, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message recorded for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(value)` when nothing failed, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// `field: message` pairs joined by `; `.
fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// REFERENCE DATASET
// =============================================================================

/// The reference dataset could not be loaded or is internally inconsistent.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// JSON could not be parsed into rows.
    #[error("reference dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The dataset holds no rows for a sex.
    #[error("reference dataset has no rows for {0}")]
    MissingSex(Sex),

    /// Two rows share the same sex and age.
    #[error("duplicate reference row for {sex} at {age_months} months")]
    DuplicateRow { sex: Sex, age_months: u32 },

    /// A value is not a finite positive number.
    #[error("invalid value in {column} for {sex} at {age_months} months")]
    InvalidValue {
        sex: Sex,
        age_months: u32,
        column: &'static str,
    },

    /// The SD columns are not strictly increasing from -3SD to +3SD.
    #[error("SD columns out of order for {sex} at {age_months} months")]
    UnorderedColumns { sex: Sex, age_months: u32 },
}

// =============================================================================
// ASSESSMENT
// =============================================================================

/// Failure of a full assessment request.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

impl AssessmentError {
    /// The validation failures, if this is a validation error.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            AssessmentError::Validation(errors) => Some(errors),
            AssessmentError::Reference(_) => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
