//! Failure kinds reported by validators

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named validation failure attached to a field (or, for the
/// cross-field date rule, to the whole record).
///
/// A field may carry more than one kind at a time: the required rule and
/// a pattern rule evaluate independently, so an empty name reports both
/// `Required` and `InvalidName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationError {
    #[error("value is required")]
    Required,
    #[error("value is too short")]
    TooShort,
    #[error("only letters and spaces are allowed")]
    InvalidName,
    #[error("phone must be 9 digits starting with 6, 7 or 9")]
    InvalidPhone,
    #[error("not a valid DNI or NIE")]
    InvalidDni,
    #[error("not a valid email address")]
    InvalidEmail,
    #[error("email is already registered")]
    EmailTaken,
    #[error("email lookup failed")]
    LookupFailed,
    #[error("traveler must be at least 18 years old")]
    UnderAge,
    #[error("date must be later than today")]
    NotFuture,
    #[error("return date must be later than departure date")]
    InvalidRange,
    #[error("value is out of range")]
    OutOfRange,
    #[error("must be accepted")]
    NotAccepted,
}

/// Transport failure from an email directory lookup.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
