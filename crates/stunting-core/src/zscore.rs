//! # HAZ Score & Classifier
//!
//! Height-for-age z-score against one row of SD columns, and the WHO
//! stunting classification of that score.
//!
//! The SD width is taken from the side of the median the child is on:
//! `median - sd1neg` below the median, `sd1 - median` at or above it.
//! This keeps the score consistent with the tabulated SD lines when the
//! distribution is skewed.
//!
//! The score is rounded to 2 decimals and the status is read from the
//! rounded score, so the displayed number and the displayed status can
//! never disagree.

use crate::standards::SdColumns;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Scores strictly below this are severely stunted.
pub const SEVERE_THRESHOLD: f64 = -3.0;

/// Scores strictly below this (and not severe) are stunted.
pub const STUNTED_THRESHOLD: f64 = -2.0;

/// Scores strictly above this are tall.
pub const TALL_THRESHOLD: f64 = 3.0;

// =============================================================================
// STATUS
// =============================================================================

/// Height-for-age status bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazStatus {
    SeverelyStunted,
    Stunted,
    Normal,
    Tall,
}

impl HazStatus {
    /// Classify a (rounded) z-score.
    #[must_use]
    pub fn from_score(haz: f64) -> Self {
        if haz < SEVERE_THRESHOLD {
            HazStatus::SeverelyStunted
        } else if haz < STUNTED_THRESHOLD {
            HazStatus::Stunted
        } else if haz <= TALL_THRESHOLD {
            HazStatus::Normal
        } else {
            HazStatus::Tall
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HazStatus::SeverelyStunted => "severely_stunted",
            HazStatus::Stunted => "stunted",
            HazStatus::Normal => "normal",
            HazStatus::Tall => "tall",
        }
    }

    /// True for both stunting buckets.
    #[must_use]
    pub fn is_stunted(self) -> bool {
        matches!(self, HazStatus::SeverelyStunted | HazStatus::Stunted)
    }

    /// The fixed display bundle for this status.
    #[must_use]
    pub fn interpretation(self) -> Interpretation {
        match self {
            HazStatus::SeverelyStunted => Interpretation {
                title: "Severely stunted",
                description: "Height is far below the WHO standard for this age (below -3 SD). \
                              This points to long-term undernutrition or repeated illness.",
                recommendation: "Bring the child to the Puskesmas or a doctor promptly for a \
                                 clinical assessment and a supervised nutrition plan.",
                color: "red",
            },
            HazStatus::Stunted => Interpretation {
                title: "Stunted",
                description: "Height is below the WHO standard for this age (between -3 SD and -2 SD).",
                recommendation: "Consult a health worker or Posyandu cadre, add animal protein and \
                                 varied foods to every meal, and measure height every month.",
                color: "orange",
            },
            HazStatus::Normal => Interpretation {
                title: "Normal",
                description: "Height is within the normal range for this age (-2 SD to +3 SD).",
                recommendation: "Keep up balanced meals, clean water and sanitation, and attend the \
                                 monthly Posyandu session to keep tracking growth.",
                color: "green",
            },
            HazStatus::Tall => Interpretation {
                title: "Tall",
                description: "Height is above the normal range for this age (above +3 SD).",
                recommendation: "Usually not a concern. If both parents are of average height, ask \
                                 a health worker whether a hormonal check is needed.",
                color: "blue",
            },
        }
    }
}

impl fmt::Display for HazStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// INTERPRETATION
// =============================================================================

/// Human-readable explanation of a status, used only for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub title: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
    /// Severity color token: `red`, `orange`, `green` or `blue`.
    pub color: &'static str,
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Output of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    /// HAZ rounded to 2 decimals.
    pub haz_score: f64,
    pub status: HazStatus,
    pub interpretation: Interpretation,
}

/// Unrounded HAZ: `(height - median) / SD`, SD taken from the child's side of the median.
///
/// `columns` must be strictly increasing, which every [`crate::StandardsTable`] row is.
#[must_use]
pub fn raw_haz(height_cm: f64, columns: &SdColumns) -> f64 {
    let sd = if height_cm < columns.median {
        columns.sd_below()
    } else {
        columns.sd_above()
    };
    (height_cm - columns.median) / sd
}

/// Round half away from zero to 2 decimals, folding `-0.0` into `0.0`.
#[must_use]
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Score and classify a height against one row of SD columns.
#[must_use]
pub fn classify(height_cm: f64, columns: &SdColumns) -> Classification {
    let haz_score = round2(raw_haz(height_cm, columns));
    let status = HazStatus::from_score(haz_score);
    Classification {
        haz_score,
        status,
        interpretation: status.interpretation(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
