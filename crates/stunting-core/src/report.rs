//! # Report Module
//!
//! Plain-text rendering of an [`AssessmentResult`] for terminals and logs.
//!
//! The layout has three blocks:
//! - RESULT: status, score, age and height
//! - INTERPRETATION: the fixed guidance for the status
//! - REFERENCE: the SD columns used, with the child's band marked

use crate::assessment::AssessmentResult;
use crate::standards::{SdColumns, WhoStandardEntry};

const RULE_TOP: &str = "┌─────────────────────────────────────┐\n";
const RULE_MID: &str = "├─────────────────────────────────────┤\n";
const RULE_END: &str = "└─────────────────────────────────────┘\n";

/// Display label for an SD column name.
#[must_use]
pub fn column_label(name: &str) -> &'static str {
    match name {
        "sd3neg" => "-3 SD",
        "sd2neg" => "-2 SD",
        "sd1neg" => "-1 SD",
        "median" => "Median",
        "sd1" => "+1 SD",
        "sd2" => "+2 SD",
        "sd3" => "+3 SD",
        _ => "?",
    }
}

/// Index of the SD line closest to `height_cm`.
fn nearest_column(height_cm: f64, columns: &SdColumns) -> usize {
    columns
        .values()
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - height_cm)
                .abs()
                .total_cmp(&(*b - height_cm).abs())
        })
        .map(|(i, _)| i)
        .unwrap_or(3)
}

/// Render a result with the standard boxed template.
#[must_use]
pub fn render_text(result: &AssessmentResult) -> String {
    let mut output = String::new();

    output.push_str(RULE_TOP);
    output.push_str("│ RESULT                              │\n");
    output.push_str(&format!(
        "│ - Status: {} ({})\n",
        result.interpretation.title, result.status
    ));
    output.push_str(&format!("│ - HAZ score: {:.2}\n", result.haz_score));
    output.push_str(&format!(
        "│ - Age: {} months ({})\n",
        result.age_months,
        result.gender.label()
    ));
    output.push_str(&format!("│ - Height: {:.1} cm\n", result.height));
    output.push_str(&format!(
        "│ - Median for age: {:.1} cm\n",
        result.median_height
    ));
    if result.clamped {
        output.push_str(&format!(
            "│ - Note: age is beyond the table, {}-month values used\n",
            result.standards_age_months
        ));
    }

    output.push_str(RULE_MID);
    output.push_str("│ INTERPRETATION                      │\n");
    output.push_str(&format!("│ - {}\n", result.interpretation.description));
    output.push_str(&format!("│ - {}\n", result.interpretation.recommendation));

    output.push_str(RULE_MID);
    output.push_str(&format!(
        "│ REFERENCE ({} months)                \n",
        result.standards_age_months
    ));
    let marker = nearest_column(result.height, &result.standards);
    for (i, (name, value)) in result.standards.iter().enumerate() {
        let pointer = if i == marker { "  ◀ child" } else { "" };
        output.push_str(&format!(
            "│ {:>7}: {:>6.1} cm{}\n",
            column_label(name),
            value,
            pointer
        ));
    }

    output.push_str(RULE_END);

    output
}

/// Render reference rows as a fixed-width table.
#[must_use]
pub fn render_table<'a>(rows: impl IntoIterator<Item = &'a WhoStandardEntry>) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:>5}", "Age"));
    for name in SdColumns::NAMES {
        output.push_str(&format!(" {:>7}", column_label(name)));
    }
    output.push('\n');

    for row in rows {
        output.push_str(&format!("{:>5}", row.age_months));
        for value in row.columns.values() {
            output.push_str(&format!(" {:>7.1}", value));
        }
        output.push('\n');
    }

    output
}

// =============================================================================
// TESTS
// =============================================================================
