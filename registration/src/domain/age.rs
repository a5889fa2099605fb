//! Standalone age calculator.
//!
//! Computes a person's age in whole years for display or storage. Unlike
//! [`validate_age`](super::validation::validate_age) this is not a pass/fail
//! gate; its failures use a plain-message vocabulary that existing consumers
//! match on, so the `Display` strings of [`AgeError`] must stay verbatim.
//!
//! The subject is an untyped JSON value carrying a `birth` attribute, which
//! keeps "missing subject", "missing field" and "wrong type" observable.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use mockable::Clock;
use serde_json::Value;
use thiserror::Error;

use super::calendar::{DateParseError, parse_calendar_date, whole_years_between};

/// Earliest birth year the calculator accepts.
pub const EARLIEST_BIRTH_YEAR: i32 = 1970;

/// Failures raised by [`calculate_age`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AgeError {
    /// No subject was supplied.
    #[error("missing param p")]
    MissingSubject,
    /// The subject has no `birth` attribute.
    #[error("missing birth field")]
    MissingBirth,
    /// The `birth` attribute is not a well-formed date.
    #[error("birth must be a valid Date")]
    InvalidBirth,
    /// The date is before 1970, after the reference date, or not a real day.
    #[error("invalid date")]
    InvalidDate,
}

/// Age in whole years of `subject` on `reference`.
///
/// # Errors
///
/// See [`AgeError`] for the failure vocabulary.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use registration::domain::age::{AgeError, calculate_age};
/// use serde_json::json;
///
/// let reference = NaiveDate::from_ymd_opt(2026, 12, 1).expect("valid date");
/// let subject = json!({ "birth": "1991-11-07" });
/// assert_eq!(calculate_age(Some(&subject), reference), Ok(35));
/// assert_eq!(calculate_age(None, reference), Err(AgeError::MissingSubject));
/// ```
pub fn calculate_age(subject: Option<&Value>, reference: NaiveDate) -> Result<u32, AgeError> {
    let person = match subject {
        None | Some(Value::Null) => return Err(AgeError::MissingSubject),
        Some(value) => value,
    };

    let raw_birth = person
        .as_object()
        .and_then(|object| object.get("birth"))
        .ok_or(AgeError::MissingBirth)?;

    let birth = match raw_birth.as_str().map(parse_calendar_date) {
        Some(Ok(date)) => date,
        Some(Err(DateParseError::NotACalendarDate)) => return Err(AgeError::InvalidDate),
        Some(Err(DateParseError::Malformed)) | None => return Err(AgeError::InvalidBirth),
    };

    if birth.year() < EARLIEST_BIRTH_YEAR || birth > reference {
        return Err(AgeError::InvalidDate);
    }

    Ok(whole_years_between(birth, reference))
}

/// Age calculator that defaults the reference date to "today" from a clock.
#[derive(Clone)]
pub struct AgeCalculator {
    clock: Arc<dyn Clock>,
}

impl AgeCalculator {
    /// Build a calculator reading "today" from `clock`.
    #[must_use]
    pub const fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Today's date in the clock's local time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.local().date_naive()
    }

    /// Age of `subject` on `reference`, or on today when `reference` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// See [`calculate_age`].
    pub fn age_of(
        &self,
        subject: Option<&Value>,
        reference: Option<NaiveDate>,
    ) -> Result<u32, AgeError> {
        let on = reference.unwrap_or_else(|| self.today());
        calculate_age(subject, on)
    }
}
