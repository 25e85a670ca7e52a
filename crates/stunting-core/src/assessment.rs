//! # Growth Assessment
//!
//! Request validation and orchestration:
//!
//! ```text
//! AssessmentRequest ─validate─▶ AssessmentInput ─assess─▶ AssessmentResult
//!                                   │
//!                 age_in_months ◀───┤
//!                 table.lookup  ◀───┤
//!                 classify      ◀───┘
//! ```
//!
//! Nothing here reads the clock. The caller passes `today`, which keeps
//! every assessment reproducible.

use crate::age::age_in_months;
use crate::error::{AssessmentError, Field, ReferenceError, ValidationErrors};
use crate::standards::{Lookup, SdColumns, StandardsTable};
use crate::zscore::{HazStatus, Interpretation, classify};
use crate::{MAX_AGE_MONTHS, MAX_HEIGHT_CM, MIN_HEIGHT_CM, Sex};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Accepted birth date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// REQUEST (untrusted)
// =============================================================================

/// Height as sent by a client: a JSON number or a numeric string.
///
/// Strings accept a decimal comma (`"87,5"`), as typed on Indonesian
/// keyboards and forms. Any other JSON value lands in `Other` so that
/// validation can report it against the height field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeightValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl HeightValue {
    /// Numeric value, if the input is a finite number.
    #[must_use]
    pub fn to_cm(&self) -> Option<f64> {
        let value = match self {
            HeightValue::Number(n) => *n,
            HeightValue::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
            HeightValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for HeightValue {
    fn from(value: f64) -> Self {
        HeightValue::Number(value)
    }
}

/// Raw calculator form, exactly as received.
///
/// Wrongly typed values never fail deserialization. They are kept as text
/// and rejected by [`validate`] with a message for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: Option<String>,
    #[serde(default)]
    pub height: Option<HeightValue>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub birth_date: Option<String>,
}

/// `null` is absent, strings pass through, anything else becomes its JSON text.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

impl AssessmentRequest {
    pub fn new(gender: impl Into<String>, height: impl Into<HeightValue>, birth_date: impl Into<String>) -> Self {
        Self {
            gender: Some(gender.into()),
            height: Some(height.into()),
            birth_date: Some(birth_date.into()),
        }
    }
}

// =============================================================================
// INPUT (validated)
// =============================================================================

/// A request that passed every constraint. Only built by [`validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentInput {
    sex: Sex,
    height_cm: f64,
    birth_date: NaiveDate,
}

impl AssessmentInput {
    /// Check typed values against the calculator's constraints.
    pub fn new(sex: Sex, height_cm: f64, birth_date: NaiveDate, today: NaiveDate) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_height(height_cm, &mut errors);
        check_birth_date(birth_date, today, &mut errors);
        errors.into_result(Self {
            sex,
            height_cm,
            birth_date,
        })
    }

    #[must_use]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    #[must_use]
    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    #[must_use]
    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }
}

fn check_height(height_cm: f64, errors: &mut ValidationErrors) {
    if !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&height_cm) {
        errors.push(
            Field::Height,
            format!("height must be between {MIN_HEIGHT_CM} and {MAX_HEIGHT_CM} cm"),
        );
    }
}

fn check_birth_date(birth_date: NaiveDate, today: NaiveDate, errors: &mut ValidationErrors) {
    if birth_date >= today {
        errors.push(Field::BirthDate, "birth date must be in the past");
        return;
    }
    let earliest = today.checked_sub_months(Months::new(MAX_AGE_MONTHS));
    if earliest.is_some_and(|earliest| birth_date < earliest) {
        errors.push(
            Field::BirthDate,
            "calculator supports children under 5 years only",
        );
    }
}

/// Validate a raw request. Every failing field is reported, not just the first.
pub fn validate(request: &AssessmentRequest, today: NaiveDate) -> Result<AssessmentInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let sex = match request.gender.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(Field::Gender, "gender is required");
            None
        }
        Some(raw) => match raw.parse::<Sex>() {
            Ok(sex) => Some(sex),
            Err(_) => {
                errors.push(Field::Gender, "gender must be boys or girls");
                None
            }
        },
    };

    let height_cm = match &request.height {
        None => {
            errors.push(Field::Height, "height is required");
            None
        }
        Some(value) => match value.to_cm() {
            Some(cm) => {
                check_height(cm, &mut errors);
                Some(cm)
            }
            None => {
                errors.push(Field::Height, "height must be a number");
                None
            }
        },
    };

    let birth_date = match request.birth_date.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(Field::BirthDate, "birth date is required");
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => {
                check_birth_date(date, today, &mut errors);
                Some(date)
            }
            Err(_) => {
                errors.push(Field::BirthDate, "birth date must be a date in YYYY-MM-DD format");
                None
            }
        },
    };

    match (sex, height_cm, birth_date) {
        (Some(sex), Some(height_cm), Some(birth_date)) if errors.is_empty() => Ok(AssessmentInput {
            sex,
            height_cm,
            birth_date,
        }),
        _ => Err(errors),
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// Everything the presentation layer needs to render a result card and
/// the reference table beside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub gender: Sex,
    pub birth_date: NaiveDate,
    pub reference_date: NaiveDate,
    pub age_months: u32,
    /// Echo of the measured height (cm).
    pub height: f64,
    pub haz_score: f64,
    pub status: HazStatus,
    pub median_height: f64,
    /// SD columns used for the score.
    pub standards: SdColumns,
    /// Tabulated age the standards come from.
    pub standards_age_months: u32,
    /// The age was outside the table and clamped to its boundary.
    pub clamped: bool,
    pub interpretation: Interpretation,
}

// =============================================================================
// ASSESSOR
// =============================================================================

/// Stateless assessor over a shared, immutable reference table.
#[derive(Debug, Clone)]
pub struct GrowthAssessor {
    table: Arc<StandardsTable>,
}

impl GrowthAssessor {
    #[must_use]
    pub fn new(table: Arc<StandardsTable>) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &StandardsTable {
        &self.table
    }

    /// Reference values for display, without assessing anyone.
    pub fn standards(&self, sex: Sex, age_months: u32) -> Result<Lookup, ReferenceError> {
        self.table.lookup(sex, age_months)
    }

    /// Assess an already validated input.
    pub fn assess(&self, input: &AssessmentInput, today: NaiveDate) -> Result<AssessmentResult, AssessmentError> {
        let age_months = age_in_months(input.birth_date, today);
        let lookup = self.table.lookup(input.sex, age_months)?;
        let classification = classify(input.height_cm, &lookup.columns);

        Ok(AssessmentResult {
            gender: input.sex,
            birth_date: input.birth_date,
            reference_date: today,
            age_months,
            height: input.height_cm,
            haz_score: classification.haz_score,
            status: classification.status,
            median_height: lookup.columns.median,
            standards: lookup.columns,
            standards_age_months: lookup.table_age_months,
            clamped: lookup.clamped,
            interpretation: classification.interpretation,
        })
    }

    /// Validate and assess a raw request.
    pub fn assess_request(&self, request: &AssessmentRequest, today: NaiveDate) -> Result<AssessmentResult, AssessmentError> {
        let input = validate(request, today)?;
        self.assess(&input, today)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn today() -> NaiveDate {
        date(2026, 10, 10)
    }

    fn assessor() -> GrowthAssessor {
        let table = StandardsTable::who_default().expect("embedded dataset must load");
        GrowthAssessor::new(Arc::new(table))
    }

    fn validation(result: Result<AssessmentResult, AssessmentError>) -> ValidationErrors {
        match result {
            Err(AssessmentError::Validation(errors)) => errors,
            other => {
                assert!(other.is_err(), "expected validation failure, got {other:?}");
                ValidationErrors::new()
            }
        }
    }

    // -------------------------------------------------------------------------
    // End-to-end
    // -------------------------------------------------------------------------

    #[test]
    fn boy_at_median_for_24_months_is_normal() {
        let assessor = assessor();
        let request = AssessmentRequest::new("boys", 87.1, "2024-10-10");
        let result = assessor.assess_request(&request, today()).expect("assessment");

        assert_eq!(result.age_months, 24);
        assert_eq!(result.haz_score, 0.0);
        assert_eq!(result.status, HazStatus::Normal);
        assert_abs_diff_eq!(result.median_height, 87.1, epsilon = 1e-9);
        assert_eq!(result.standards_age_months, 24);
        assert!(!result.clamped);
        assert_eq!(result.interpretation.color, "green");
    }

    #[test]
    fn boy_just_below_minus_two_sd_at_12_months_is_stunted() {
        let assessor = assessor();
        let request = AssessmentRequest::new("boys", 70.9, "2025-10-10");
        let result = assessor.assess_request(&request, today()).expect("assessment");

        assert_eq!(result.age_months, 12);
        assert_abs_diff_eq!(result.standards.sd2neg, 71.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.haz_score, -2.09, epsilon = 1e-9);
        assert_eq!(result.status, HazStatus::Stunted);
    }

    #[test]
    fn boy_three_sd_below_is_severely_stunted() {
        let assessor = assessor();
        let standards = assessor.standards(Sex::Male, 24).expect("lookup").columns;
        let height = standards.median - 3.5 * standards.sd_below();
        let request = AssessmentRequest::new("boys", height, "2024-10-10");
        let result = assessor.assess_request(&request, today()).expect("assessment");

        assert_eq!(result.status, HazStatus::SeverelyStunted);
        assert!(result.haz_score < -3.0);
    }

    #[test]
    fn girl_between_minus_three_and_minus_two_is_stunted() {
        let assessor = assessor();
        let standards = assessor.standards(Sex::Female, 24).expect("lookup").columns;
        let height = standards.median - 2.5 * standards.sd_below();
        let request = AssessmentRequest::new("girls", height, "2024-10-10");
        let result = assessor.assess_request(&request, today()).expect("assessment");

        assert_eq!(result.gender, Sex::Female);
        assert_eq!(result.status, HazStatus::Stunted);
        assert_abs_diff_eq!(result.haz_score, -2.5, epsilon = 0.011);
    }

    #[test]
    fn late_month_birth_uses_rounded_age() {
        let assessor = assessor();
        // 23 whole months, born on the 20th -> 24
        let request = AssessmentRequest::new("boys", 87.1, "2024-10-20");
        let result = assessor.assess_request(&request, today()).expect("assessment");
        assert_eq!(result.age_months, 24);
    }

    #[test]
    fn age_sixty_one_clamps_to_last_row() {
        let assessor = assessor();
        // Exactly 60 months, born after the 15th -> 61
        let today = date(2026, 10, 20);
        let request = AssessmentRequest::new("girls", 109.4, "2021-10-20");
        let result = assessor.assess_request(&request, today).expect("assessment");

        assert_eq!(result.age_months, 61);
        assert_eq!(result.standards_age_months, 60);
        assert!(result.clamped);
        assert_eq!(result.status, HazStatus::Normal);
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    #[test]
    fn height_below_minimum_rejected() {
        let errors = validation(assessor().assess_request(&AssessmentRequest::new("boys", 5.0, "2024-10-10"), today()));
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(Field::Height));
    }

    #[test]
    fn height_above_maximum_rejected() {
        let errors = validation(assessor().assess_request(&AssessmentRequest::new("boys", 200.5, "2024-10-10"), today()));
        assert!(errors.contains(Field::Height));
    }

    #[test]
    fn height_bounds_are_inclusive() {
        assert!(validate(&AssessmentRequest::new("boys", 10.0, "2024-10-10"), today()).is_ok());
        assert!(validate(&AssessmentRequest::new("boys", 200.0, "2024-10-10"), today()).is_ok());
    }

    #[test]
    fn birth_date_six_years_ago_rejected() {
        let errors = validation(assessor().assess_request(&AssessmentRequest::new("girls", 110.0, "2020-10-10"), today()));
        assert_eq!(
            errors.get(Field::BirthDate),
            Some("calculator supports children under 5 years only")
        );
    }

    #[test]
    fn birth_date_exactly_five_years_ago_accepted() {
        let input = validate(&AssessmentRequest::new("girls", 109.0, "2021-10-10"), today());
        assert!(input.is_ok());
    }

    #[test]
    fn birth_date_today_or_future_rejected() {
        let errors = validate(&AssessmentRequest::new("boys", 50.0, "2026-10-10"), today()).err().unwrap_or_default();
        assert_eq!(errors.get(Field::BirthDate), Some("birth date must be in the past"));

        let errors = validate(&AssessmentRequest::new("boys", 50.0, "2027-01-01"), today()).err().unwrap_or_default();
        assert!(errors.contains(Field::BirthDate));
    }

    #[test]
    fn malformed_birth_date_rejected() {
        let errors = validate(&AssessmentRequest::new("boys", 50.0, "10/10/2024"), today()).err().unwrap_or_default();
        assert!(errors.contains(Field::BirthDate));
    }

    #[test]
    fn missing_fields_reported_together() {
        let errors = validate(&AssessmentRequest::default(), today()).err().unwrap_or_default();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Gender), Some("gender is required"));
        assert_eq!(errors.get(Field::Height), Some("height is required"));
        assert_eq!(errors.get(Field::BirthDate), Some("birth date is required"));
    }

    #[test]
    fn unknown_gender_rejected() {
        let errors = validate(&AssessmentRequest::new("robot", 80.0, "2024-10-10"), today()).err().unwrap_or_default();
        assert_eq!(errors.get(Field::Gender), Some("gender must be boys or girls"));
    }

    #[test]
    fn height_accepts_numeric_strings() {
        let request = AssessmentRequest::new("boys", HeightValue::Text("87,1".into()), "2024-10-10");
        let input = validate(&request, today()).expect("valid");
        assert_abs_diff_eq!(input.height_cm(), 87.1, epsilon = 1e-9);

        let request = AssessmentRequest::new("boys", HeightValue::Text("tall".into()), "2024-10-10");
        let errors = validate(&request, today()).err().unwrap_or_default();
        assert_eq!(errors.get(Field::Height), Some("height must be a number"));
    }

    #[test]
    fn request_deserializes_from_form_json() {
        let json = r#"{"gender": "boys", "height": "87.1", "birth_date": "2024-10-10"}"#;
        let request: AssessmentRequest = serde_json::from_str(json).expect("json");
        assert_eq!(request.height, Some(HeightValue::Text("87.1".into())));

        let json = r#"{"gender": "girls", "height": 80}"#;
        let request: AssessmentRequest = serde_json::from_str(json).expect("json");
        assert_eq!(request.height, Some(HeightValue::Number(80.0)));
        assert_eq!(request.birth_date, None);
    }

    #[test]
    fn wrongly_typed_fields_fail_validation_per_field() {
        let json = r#"{"gender": 1, "height": true, "birth_date": 20241010}"#;
        let request: AssessmentRequest = serde_json::from_str(json).expect("json");
        assert_eq!(request.gender.as_deref(), Some("1"));
        assert_eq!(request.height, Some(HeightValue::Other(Value::Bool(true))));

        let errors = validate(&request, today()).err().unwrap_or_default();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Gender), Some("gender must be boys or girls"));
        assert_eq!(errors.get(Field::Height), Some("height must be a number"));
        assert_eq!(
            errors.get(Field::BirthDate),
            Some("birth date must be a date in YYYY-MM-DD format")
        );
    }

    #[test]
    fn null_fields_count_as_missing() {
        let json = r#"{"gender": null, "height": null, "birth_date": null}"#;
        let request: AssessmentRequest = serde_json::from_str(json).expect("json");
        assert_eq!(request, AssessmentRequest::default());
    }

    #[test]
    fn typed_input_checks_constraints() {
        let ok = AssessmentInput::new(Sex::Male, 80.0, date(2024, 1, 1), today());
        assert!(ok.is_ok());

        let bad = AssessmentInput::new(Sex::Male, 5.0, date(2030, 1, 1), today()).err().unwrap_or_default();
        assert!(bad.contains(Field::Height));
        assert!(bad.contains(Field::BirthDate));
    }

    #[test]
    fn result_serializes_for_presentation() {
        let result = assessor()
            .assess_request(&AssessmentRequest::new("boys", 87.1, "2024-10-10"), today())
            .expect("assessment");
        let json = serde_json::to_value(&result).expect("json");

        assert_eq!(json["status"], "normal");
        assert_eq!(json["age_months"], 24);
        assert_eq!(json["gender"], "male");
        assert_eq!(json["birth_date"], "2024-10-10");
        assert_eq!(json["standards"]["median"], 87.1);
        assert_eq!(json["interpretation"]["title"], "Normal");
    }
}
