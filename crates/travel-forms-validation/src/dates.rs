//! Date validators: minimum age, future departure, cross-field range

use chrono::{Datelike, NaiveDate};

use crate::error::ValidationError;

/// Validates that the traveler is at least 18 years old on `today`.
///
/// Age counts whole years, decremented by one when this year's birthday
/// (month/day) has not been reached yet. An absent birth date is
/// provisionally valid; required-ness is a separate rule.
pub fn validate_adult(birth_date: Option<NaiveDate>, today: NaiveDate) -> Result<(), ValidationError> {
    let Some(birth) = birth_date else {
        return Ok(());
    };

    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }

    if age >= 18 {
        Ok(())
    } else {
        Err(ValidationError::UnderAge)
    }
}

/// Validates that a departure date is strictly later than `today`.
///
/// Comparison is at date precision, so "today" itself fails. An absent
/// date fails too, matching how an unparsable date compares.
pub fn validate_future_date(date: Option<NaiveDate>, today: NaiveDate) -> Result<(), ValidationError> {
    match date {
        Some(d) if d > today => Ok(()),
        _ => Err(ValidationError::NotFuture),
    }
}

/// Record-level rule: when both dates are present, the return date must be
/// strictly later than the departure date. With either date absent the
/// rule is not yet evaluable and counts as satisfied.
pub fn validate_date_range(
    departure: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (departure, return_date) {
        (Some(dep), Some(ret)) if ret <= dep => Err(ValidationError::InvalidRange),
        _ => Ok(()),
    }
}
