//! Registration record model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the six registration form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Family name.
    Lastname,
    /// Given name.
    Firstname,
    /// Contact email address.
    Email,
    /// Date of birth as an ISO calendar date.
    Birth,
    /// Five-digit postal code.
    PostCode,
    /// Town of residence.
    Town,
}

impl Field {
    /// Every field in display order.
    pub const ALL: [Self; 6] = [
        Self::Lastname,
        Self::Firstname,
        Self::Email,
        Self::Birth,
        Self::PostCode,
        Self::Town,
    ];

    /// Key used in the JSON representation of a [`PersonRecord`].
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Lastname => "lastname",
            Self::Firstname => "firstname",
            Self::Email => "email",
            Self::Birth => "birth",
            Self::PostCode => "postCode",
            Self::Town => "town",
        }
    }

    /// Human label shown next to the field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lastname => "Last name",
            Self::Firstname => "First name",
            Self::Email => "Email",
            Self::Birth => "Date of birth",
            Self::PostCode => "Postal code",
            Self::Town => "Town",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raised when text does not name a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field '{0}'")]
pub struct UnknownFieldError(pub String);

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "lastname" | "last-name" => Ok(Self::Lastname),
            "firstname" | "first-name" => Ok(Self::Firstname),
            "email" => Ok(Self::Email),
            "birth" => Ok(Self::Birth),
            "postCode" | "post-code" | "post_code" => Ok(Self::PostCode),
            "town" => Ok(Self::Town),
            other => Err(UnknownFieldError(other.to_owned())),
        }
    }
}

/// Flat registration record of six user-entered strings.
///
/// Values are kept exactly as typed; validation never rewrites them.
///
/// ## Invariants
/// - None at construction time. A record is submittable only once every
///   field is non-empty after trimming and passes its validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct PersonRecord {
    /// Family name.
    pub lastname: String,
    /// Given name.
    pub firstname: String,
    /// Contact email address.
    pub email: String,
    /// Date of birth, `YYYY-MM-DD`.
    pub birth: String,
    /// Five-digit postal code.
    pub post_code: String,
    /// Town of residence.
    pub town: String,
}

impl PersonRecord {
    /// Current value of `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Lastname => &self.lastname,
            Field::Firstname => &self.firstname,
            Field::Email => &self.email,
            Field::Birth => &self.birth,
            Field::PostCode => &self.post_code,
            Field::Town => &self.town,
        }
    }

    /// Replace the value of `field`.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Lastname => &mut self.lastname,
            Field::Firstname => &mut self.firstname,
            Field::Email => &mut self.email,
            Field::Birth => &mut self.birth,
            Field::PostCode => &mut self.post_code,
            Field::Town => &mut self.town,
        };
        *slot = value.into();
    }

    /// Fields whose value is empty once trimmed.
    pub fn blank_fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
    }
}
