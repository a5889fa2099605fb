//! Strict ISO calendar-date parsing and whole-years arithmetic.
//!
//! Both the age validator and the age calculator read birth dates through
//! [`parse_calendar_date`], so they agree on what a well-formed date is. A
//! date that has the right shape but names a day that does not exist is
//! reported separately from text that is not a date at all; callers decide
//! whether that distinction matters to them.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

/// Reasons a raw string could not be read as a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// The text is not shaped like `YYYY-MM-DD[THH:MM:SS...]`.
    #[error("date must be formatted as YYYY-MM-DD")]
    Malformed,
    /// The text is shaped like a date but the day does not exist.
    #[error("date does not exist in the calendar")]
    NotACalendarDate,
}

static DATE_SHAPE_RE: OnceLock<Regex> = OnceLock::new();

fn date_shape_regex() -> &'static Regex {
    DATE_SHAPE_RE.get_or_init(|| {
        let pattern = r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})(?P<time>T.+)?$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("date shape regex failed to compile: {error}"))
    })
}

/// Parse `YYYY-MM-DD`, optionally followed by an ISO 8601 time part.
///
/// The time part may carry an offset (RFC 3339) or be a local time with or
/// without seconds. The calendar date is always taken from the `YYYY-MM-DD`
/// prefix; a time part only has to be valid, it never shifts the day.
///
/// # Errors
///
/// Returns [`DateParseError::Malformed`] for text that is not a date and
/// [`DateParseError::NotACalendarDate`] for days such as `2021-02-30`.
///
/// # Examples
/// ```
/// use registration::domain::calendar::{DateParseError, parse_calendar_date};
///
/// assert!(parse_calendar_date("1991-11-07").is_ok());
/// assert_eq!(parse_calendar_date("2021-02-30"), Err(DateParseError::NotACalendarDate));
/// assert_eq!(parse_calendar_date("invalid-date"), Err(DateParseError::Malformed));
/// ```
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let captures = date_shape_regex()
        .captures(raw)
        .ok_or(DateParseError::Malformed)?;

    let component = |name: &str| -> Result<u32, DateParseError> {
        captures
            .name(name)
            .and_then(|value| value.as_str().parse::<u32>().ok())
            .ok_or(DateParseError::Malformed)
    };
    let year = i32::try_from(component("year")?).map_err(|_| DateParseError::Malformed)?;
    let month = component("month")?;
    let day = component("day")?;

    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or(DateParseError::NotACalendarDate)?;

    if captures.name("time").is_some() && !is_date_time(raw) {
        return Err(DateParseError::Malformed);
    }

    Ok(date)
}

fn is_date_time(raw: &str) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok()
        || raw.parse::<NaiveDateTime>().is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").is_ok()
}

/// Whole years elapsed from `birth` to `reference`.
///
/// The anniversary day counts as reached, and a 29 February birthday is
/// reached on 1 March in common years. Returns zero when `birth` is after
/// `reference`.
#[must_use]
pub fn whole_years_between(birth: NaiveDate, reference: NaiveDate) -> u32 {
    let mut years = reference.year() - birth.year();
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}
