//! Field validators for the registration form.
//!
//! Every validator is a pure function returning `Ok(())` on acceptance and a
//! [`ValidationError`] carrying a stable [`ValidationErrorKind`] plus a
//! human-readable message on rejection. Date-sensitive validators take the
//! reference date as a parameter; reading the wall clock is left to callers.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::calendar::{parse_calendar_date, whole_years_between};
use super::person::Field;

/// Minimum age, in whole years, accepted by [`validate_age`].
pub const MINIMUM_AGE: u32 = 18;

/// Stable machine-readable category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    /// The birth date is not a calendar date or lies in the future.
    InvalidDate,
    /// The subject is younger than [`MINIMUM_AGE`].
    InvalidAge,
    /// The postal code is not exactly five ASCII digits.
    InvalidPostCode,
    /// The first or last name is rejected.
    InvalidIdentity,
    /// The email address does not match the accepted pattern.
    InvalidEmail,
    /// The town name contains forbidden characters.
    InvalidTown,
}

impl ValidationErrorKind {
    /// Wire name of the kind, e.g. `INVALID_POST_CODE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDate => "INVALID_DATE",
            Self::InvalidAge => "INVALID_AGE",
            Self::InvalidPostCode => "INVALID_POST_CODE",
            Self::InvalidIdentity => "INVALID_IDENTITY",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidTown => "INVALID_TOWN",
        }
    }
}

/// A rejected field value.
///
/// Serialises as `{"kind": "INVALID_EMAIL", "message": "Invalid email"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    kind: ValidationErrorKind,
    message: String,
}

impl ValidationError {
    /// Build a failure of `kind` with a display message.
    #[must_use]
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// Advisory text shown next to the field.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Shorthand for validator results.
pub type ValidationResult = Result<(), ValidationError>;

const INVALID_DATE_MESSAGE: &str = "Invalid date";
const FUTURE_DATE_MESSAGE: &str = "Date of birth cannot be in the future";
const INVALID_POST_CODE_MESSAGE: &str = "Invalid postal code";
const INVALID_NAME_MESSAGE: &str = "Invalid name";
const XSS_MESSAGE: &str = "XSS detected";
const INVALID_NAME_CHARACTERS_MESSAGE: &str = "Invalid characters in name";
const INVALID_EMAIL_MESSAGE: &str = "Invalid email";
const INVALID_TOWN_MESSAGE: &str = "Invalid town";

static POST_CODE_RE: OnceLock<Regex> = OnceLock::new();
static MARKUP_RE: OnceLock<Regex> = OnceLock::new();
static IDENTITY_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static TOWN_RE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, name: &str, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("{name} regex failed to compile: {error}"))
    })
}

fn post_code_regex() -> &'static Regex {
    // `\d` would also admit non-ASCII digits.
    compiled(&POST_CODE_RE, "post code", "^[0-9]{5}$")
}

fn markup_regex() -> &'static Regex {
    compiled(&MARKUP_RE, "markup", "<[^>]+")
}

fn identity_regex() -> &'static Regex {
    compiled(&IDENTITY_RE, "identity", "^[a-zA-ZÀ-ÿ-]+$")
}

fn email_regex() -> &'static Regex {
    compiled(
        &EMAIL_RE,
        "email",
        r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$",
    )
}

fn town_regex() -> &'static Regex {
    compiled(&TOWN_RE, "town", r"^[a-zA-ZÀ-ÿ\s-]+$")
}

/// Check that `birth` names a subject at least [`MINIMUM_AGE`] years old on
/// `reference`.
///
/// # Errors
///
/// [`ValidationErrorKind::InvalidDate`] when `birth` is not a calendar date
/// or lies after `reference`; [`ValidationErrorKind::InvalidAge`] when the
/// subject is too young.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use registration::domain::validation::{ValidationErrorKind, validate_age};
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
/// assert!(validate_age("1990-05-14", today).is_ok());
/// let err = validate_age("2015-01-01", today).expect_err("too young");
/// assert_eq!(err.kind(), ValidationErrorKind::InvalidAge);
/// ```
pub fn validate_age(birth: &str, reference: NaiveDate) -> ValidationResult {
    let born = parse_calendar_date(birth)
        .map_err(|_| ValidationError::new(ValidationErrorKind::InvalidDate, INVALID_DATE_MESSAGE))?;

    if born > reference {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidDate,
            FUTURE_DATE_MESSAGE,
        ));
    }

    if whole_years_between(born, reference) < MINIMUM_AGE {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidAge,
            format!("You must be at least {MINIMUM_AGE} years old"),
        ));
    }

    Ok(())
}

/// Accept exactly five ASCII digits.
///
/// # Errors
///
/// [`ValidationErrorKind::InvalidPostCode`] for anything else.
pub fn validate_post_code(post_code: &str) -> ValidationResult {
    if post_code_regex().is_match(post_code) {
        Ok(())
    } else {
        Err(ValidationError::new(
            ValidationErrorKind::InvalidPostCode,
            INVALID_POST_CODE_MESSAGE,
        ))
    }
}

/// Accept a first or last name made of Latin letters, accented Latin letters
/// and hyphens.
///
/// Markup is reported as `XSS detected` before the character set is checked.
/// Spaces are not accepted, so multi-word names are rejected.
///
/// # Errors
///
/// [`ValidationErrorKind::InvalidIdentity`] on markup or forbidden characters.
pub fn validate_identity(name: &str) -> ValidationResult {
    if markup_regex().is_match(name) {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidIdentity,
            XSS_MESSAGE,
        ));
    }

    if !identity_regex().is_match(name) {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidIdentity,
            INVALID_NAME_CHARACTERS_MESSAGE,
        ));
    }

    Ok(())
}

/// Accept `local@domain.tld` addresses.
///
/// This is a pattern check, not an RFC 5322 parser.
///
/// # Errors
///
/// [`ValidationErrorKind::InvalidEmail`] when the pattern does not match.
pub fn validate_email(email: &str) -> ValidationResult {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new(
            ValidationErrorKind::InvalidEmail,
            INVALID_EMAIL_MESSAGE,
        ))
    }
}

/// Accept a town name made of Latin letters, accents, hyphens and
/// whitespace.
///
/// # Errors
///
/// [`ValidationErrorKind::InvalidTown`] on any other character.
pub fn validate_town(town: &str) -> ValidationResult {
    if town_regex().is_match(town) {
        Ok(())
    } else {
        Err(ValidationError::new(
            ValidationErrorKind::InvalidTown,
            INVALID_TOWN_MESSAGE,
        ))
    }
}

/// Run the validator that owns `field`.
///
/// # Errors
///
/// Propagates the field validator's failure.
pub fn validate_field(field: Field, value: &str, reference: NaiveDate) -> ValidationResult {
    match field {
        Field::Lastname | Field::Firstname => validate_identity(value),
        Field::Email => validate_email(value),
        Field::Birth => validate_age(value, reference),
        Field::PostCode => validate_post_code(value),
        Field::Town => validate_town(value),
    }
}

/// Validate an untyped JSON field value.
///
/// Anything other than a JSON string is a rejection of the field's kind; it
/// is never coerced.
///
/// # Errors
///
/// The non-string rejection, or the field validator's failure.
pub fn validate_field_value(field: Field, value: &Value, reference: NaiveDate) -> ValidationResult {
    match value {
        Value::String(text) => validate_field(field, text, reference),
        _ => Err(not_a_string(field)),
    }
}

/// Validate every field of an untyped JSON record.
///
/// Missing keys and non-object records are rejections of each field's kind.
/// An empty map means the record is valid.
#[must_use]
pub fn validate_record_value(
    record: &Value,
    reference: NaiveDate,
) -> BTreeMap<Field, ValidationError> {
    Field::ALL
        .into_iter()
        .filter_map(|field| {
            let value = record.get(field.key()).unwrap_or(&Value::Null);
            validate_field_value(field, value, reference)
                .err()
                .map(|error| (field, error))
        })
        .collect()
}

fn not_a_string(field: Field) -> ValidationError {
    match field {
        Field::Lastname | Field::Firstname => {
            ValidationError::new(ValidationErrorKind::InvalidIdentity, INVALID_NAME_MESSAGE)
        }
        Field::Email => {
            ValidationError::new(ValidationErrorKind::InvalidEmail, INVALID_EMAIL_MESSAGE)
        }
        Field::Birth => ValidationError::new(ValidationErrorKind::InvalidDate, INVALID_DATE_MESSAGE),
        Field::PostCode => ValidationError::new(
            ValidationErrorKind::InvalidPostCode,
            INVALID_POST_CODE_MESSAGE,
        ),
        Field::Town => ValidationError::new(ValidationErrorKind::InvalidTown, INVALID_TOWN_MESSAGE),
    }
}
