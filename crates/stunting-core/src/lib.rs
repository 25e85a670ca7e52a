//! # Stunting Core
//!
//! Height-for-age assessment against the WHO Child Growth Standards.
//!
//! The crate is pure: it never reads the clock, the filesystem or the
//! network. Callers load a [`StandardsTable`] once, share it behind an
//! `Arc`, and pass the reference date into every assessment.
//!
//! ```text
//! standards (static data) → age → lookup/interpolate → zscore → assessment
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stunting_core::{AssessmentRequest, GrowthAssessor, StandardsTable};
//!
//! let table = Arc::new(StandardsTable::who_default()?);
//! let assessor = GrowthAssessor::new(table);
//! let request = AssessmentRequest::new("boys", 87.1, "2024-10-10");
//! let result = assessor.assess_request(&request, today)?;
//! println!("{} ({})", result.status, result.haz_score);
//! ```

pub mod age;
pub mod assessment;
pub mod error;
pub mod report;
pub mod standards;
pub mod zscore;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use age::{age_in_months, whole_months_between};
pub use assessment::{
    AssessmentInput, AssessmentRequest, AssessmentResult, GrowthAssessor, HeightValue, validate,
};
pub use error::{AssessmentError, Field, FieldError, ReferenceError, ValidationErrors};
pub use standards::{Lookup, SdColumns, StandardsTable, WhoStandardEntry};
pub use zscore::{Classification, HazStatus, Interpretation, classify};

// =============================================================================
// LIMITS
// =============================================================================

/// Smallest accepted height in centimetres.
pub const MIN_HEIGHT_CM: f64 = 10.0;

/// Largest accepted height in centimetres.
pub const MAX_HEIGHT_CM: f64 = 200.0;

/// Oldest supported age: the calculator covers children under five.
pub const MAX_AGE_MONTHS: u32 = 60;

// =============================================================================
// SEX
// =============================================================================

/// Sex of the child, selecting which half of the reference table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Both sexes, in table order.
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Canonical identifier used in datasets and JSON (`male` / `female`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    /// Label used by the calculator form (`boys` / `girls`).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "boys",
            Sex::Female => "girls",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a gender string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised gender '{0}' (expected boys/girls or male/female)")]
pub struct ParseSexError(pub String);

impl FromStr for Sex {
    type Err = ParseSexError;

    /// Accepts the form values (`boys`, `girls`), the dataset values
    /// (`male`, `female`) and the Indonesian labels (`L`, `P`,
    /// `laki-laki`, `perempuan`). Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "boy" | "boys" | "m" | "l" | "laki-laki" => Ok(Sex::Male),
            "female" | "girl" | "girls" | "f" | "p" | "perempuan" => Ok(Sex::Female),
            other => Err(ParseSexError(other.to_string())),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
