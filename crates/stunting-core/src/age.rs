//! # Age Calculator
//!
//! Age in completed calendar months, with the calculator's rounding rule:
//! a child born after the 15th of a month is counted one month older.
//!
//! The rule biases mid-month births upward so that a child born on the
//! 20th and assessed on the 10th, 24 months later, reads as 24 months
//! rather than 23.

use chrono::{Datelike, NaiveDate};

/// Birth days after this day-of-month round the age up by one month.
pub const ROUND_UP_AFTER_DAY: u32 = 15;

/// Completed calendar months between `birth` and `reference`.
///
/// A month is complete once the reference day-of-month reaches the birth
/// day-of-month. Returns 0 when `reference` is not after `birth`.
#[must_use]
pub fn whole_months_between(birth: NaiveDate, reference: NaiveDate) -> u32 {
    if reference <= birth {
        return 0;
    }

    let years = i64::from(reference.year()) - i64::from(birth.year());
    let mut months = years * 12 + i64::from(reference.month()) - i64::from(birth.month());
    if reference.day() < birth.day() {
        months -= 1;
    }

    u32::try_from(months.max(0)).unwrap_or(u32::MAX)
}

/// Age in months as used for the reference lookup.
///
/// Whole calendar months, plus one when the birth day-of-month is after
/// the 15th. Same-day (or a birth date after `reference`) yields 0.
#[must_use]
pub fn age_in_months(birth: NaiveDate, reference: NaiveDate) -> u32 {
    if reference <= birth {
        return 0;
    }

    let months = whole_months_between(birth, reference);
    if birth.day() > ROUND_UP_AFTER_DAY {
        months.saturating_add(1)
    } else {
        months
    }
}

// =============================================================================
// TESTS
// =============================================================================
