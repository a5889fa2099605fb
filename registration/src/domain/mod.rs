//! Domain types, validators and ports.

pub mod age;
pub mod calendar;
pub mod counter;
pub mod form;
pub mod person;
pub mod ports;
pub mod validation;

pub use self::age::{AgeCalculator, AgeError, calculate_age};
pub use self::form::{FieldState, FormController, FormError, SubmitOutcome};
pub use self::person::{Field, PersonRecord};
pub use self::validation::{ValidationError, ValidationErrorKind};
