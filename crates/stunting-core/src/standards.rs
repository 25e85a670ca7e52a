//! # WHO Reference Table
//!
//! Length/height-for-age standards, one row per sex and age in months,
//! with seven SD columns (-3SD … +3SD).
//!
//! ## Design Principles
//!
//! - Loaded once, immutable afterwards. Share it behind an `Arc`.
//! - `BTreeMap` per sex for deterministic ordering and bracketing lookups.
//! - Every row is checked at load time: finite positive values, strictly
//!   increasing columns, no duplicate ages, both sexes present.
//!
//! ## Lookup Policy
//!
//! - exact age → that row
//! - between two tabulated ages → linear interpolation of every column
//! - outside the tabulated domain → clamp to the boundary row, no extrapolation

use crate::Sex;
use crate::error::ReferenceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Embedded WHO length/height-for-age table, 0–60 months, both sexes.
///
/// Rows 0–23 are recumbent length, rows 24–60 standing height.
const WHO_LHFA_0_60: &str = include_str!("../data/who_lhfa_0_60.json");

// =============================================================================
// SD COLUMNS
// =============================================================================

/// The seven SD reference heights (cm) for one sex and age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SdColumns {
    pub sd3neg: f64,
    pub sd2neg: f64,
    pub sd1neg: f64,
    pub median: f64,
    pub sd1: f64,
    pub sd2: f64,
    pub sd3: f64,
}

impl SdColumns {
    /// Column names in ascending order.
    pub const NAMES: [&'static str; 7] = ["sd3neg", "sd2neg", "sd1neg", "median", "sd1", "sd2", "sd3"];

    #[must_use]
    pub fn from_values(values: [f64; 7]) -> Self {
        let [sd3neg, sd2neg, sd1neg, median, sd1, sd2, sd3] = values;
        Self {
            sd3neg,
            sd2neg,
            sd1neg,
            median,
            sd1,
            sd2,
            sd3,
        }
    }

    /// Column values in ascending order.
    #[must_use]
    pub fn values(&self) -> [f64; 7] {
        [
            self.sd3neg,
            self.sd2neg,
            self.sd1neg,
            self.median,
            self.sd1,
            self.sd2,
            self.sd3,
        ]
    }

    /// `(name, value)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        Self::NAMES.into_iter().zip(self.values())
    }

    /// Width of one SD below the median.
    #[must_use]
    pub fn sd_below(&self) -> f64 {
        self.median - self.sd1neg
    }

    /// Width of one SD above the median.
    #[must_use]
    pub fn sd_above(&self) -> f64 {
        self.sd1 - self.median
    }

    /// Column-wise linear interpolation: `t = 0` gives `self`, `t = 1` gives `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let a = self.values();
        let b = other.values();
        Self::from_values(std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t))
    }

    fn check(&self, sex: Sex, age_months: u32) -> Result<(), ReferenceError> {
        for (column, value) in self.iter() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReferenceError::InvalidValue {
                    sex,
                    age_months,
                    column,
                });
            }
        }

        let values = self.values();
        if values.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ReferenceError::UnorderedColumns { sex, age_months });
        }

        Ok(())
    }
}

// =============================================================================
// ROWS
// =============================================================================

/// One row of a reference dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhoStandardEntry {
    pub sex: Sex,
    pub age_months: u32,
    #[serde(flatten)]
    pub columns: SdColumns,
}

/// On-disk dataset envelope.
#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(default = "default_indicator")]
    indicator: String,
    rows: Vec<WhoStandardEntry>,
}

fn default_indicator() -> String {
    String::from("height_for_age")
}

// =============================================================================
// LOOKUP RESULT
// =============================================================================

/// Reference values resolved for one sex and age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lookup {
    pub sex: Sex,
    /// The age that was asked for.
    pub age_months: u32,
    /// The tabulated age the values come from (differs only when clamped).
    pub table_age_months: u32,
    pub columns: SdColumns,
    /// Values were linearly interpolated between two rows.
    pub interpolated: bool,
    /// Age fell outside the table and was clamped to a boundary row.
    pub clamped: bool,
}

// =============================================================================
// STANDARDS TABLE
// =============================================================================

/// Immutable reference table for both sexes.
#[derive(Debug, Clone)]
pub struct StandardsTable {
    indicator: String,
    male: BTreeMap<u32, SdColumns>,
    female: BTreeMap<u32, SdColumns>,
}

impl StandardsTable {
    /// The embedded WHO length/height-for-age table (0–60 months).
    pub fn who_default() -> Result<Self, ReferenceError> {
        Self::from_json_str(WHO_LHFA_0_60)
    }

    /// Parse a dataset document: `{ "indicator": "...", "rows": [...] }`.
    pub fn from_json_str(json: &str) -> Result<Self, ReferenceError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        let mut table = Self::from_rows(dataset.rows)?;
        table.indicator = dataset.indicator;
        Ok(table)
    }

    /// Build a table from rows, checking every dataset invariant.
    pub fn from_rows(rows: impl IntoIterator<Item = WhoStandardEntry>) -> Result<Self, ReferenceError> {
        let mut male = BTreeMap::new();
        let mut female = BTreeMap::new();

        for row in rows {
            row.columns.check(row.sex, row.age_months)?;
            let target = match row.sex {
                Sex::Male => &mut male,
                Sex::Female => &mut female,
            };
            if target.insert(row.age_months, row.columns).is_some() {
                return Err(ReferenceError::DuplicateRow {
                    sex: row.sex,
                    age_months: row.age_months,
                });
            }
        }

        if male.is_empty() {
            return Err(ReferenceError::MissingSex(Sex::Male));
        }
        if female.is_empty() {
            return Err(ReferenceError::MissingSex(Sex::Female));
        }

        Ok(Self {
            indicator: default_indicator(),
            male,
            female,
        })
    }

    fn rows_for(&self, sex: Sex) -> &BTreeMap<u32, SdColumns> {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }

    /// Dataset indicator name (e.g. `height_for_age`).
    #[must_use]
    pub fn indicator(&self) -> &str {
        &self.indicator
    }

    /// Total number of rows across both sexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.male.len() + self.female.len()
    }

    /// Always false for a constructed table; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First and last tabulated age for `sex`.
    #[must_use]
    pub fn age_range(&self, sex: Sex) -> Option<(u32, u32)> {
        let rows = self.rows_for(sex);
        let first = rows.keys().next()?;
        let last = rows.keys().next_back()?;
        Some((*first, *last))
    }

    /// Tabulated rows for `sex`, ascending by age.
    pub fn rows(&self, sex: Sex) -> impl Iterator<Item = WhoStandardEntry> + '_ {
        self.rows_for(sex)
            .iter()
            .map(move |(&age_months, &columns)| WhoStandardEntry {
                sex,
                age_months,
                columns,
            })
    }

    /// Resolve reference values for `sex` at `age_months`.
    ///
    /// Exact rows are returned as-is, gaps are linearly interpolated and
    /// out-of-domain ages clamp to the nearest boundary row.
    pub fn lookup(&self, sex: Sex, age_months: u32) -> Result<Lookup, ReferenceError> {
        let rows = self.rows_for(sex);

        if let Some(&columns) = rows.get(&age_months) {
            return Ok(Lookup {
                sex,
                age_months,
                table_age_months: age_months,
                columns,
                interpolated: false,
                clamped: false,
            });
        }

        let lower = rows.range(..age_months).next_back();
        let upper = rows
            .range((Bound::Excluded(age_months), Bound::Unbounded))
            .next();

        let (table_age_months, columns, interpolated, clamped) = match (lower, upper) {
            (Some((&lo_age, lo)), Some((&hi_age, hi))) => {
                let t = f64::from(age_months - lo_age) / f64::from(hi_age - lo_age);
                (age_months, lo.lerp(hi, t), true, false)
            }
            (None, Some((&hi_age, hi))) => (hi_age, *hi, false, true),
            (Some((&lo_age, lo)), None) => (lo_age, *lo, false, true),
            (None, None) => return Err(ReferenceError::MissingSex(sex)),
        };

        Ok(Lookup {
            sex,
            age_months,
            table_age_months,
            columns,
            interpolated,
            clamped,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
