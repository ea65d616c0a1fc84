//! Client identity validators: full name, Spanish phone, DNI/NIE

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

// Letters (including accented vowels and ñ) and whitespace, nothing else
static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").unwrap());

// Exactly 9 digits, starting with 6, 7 or 9
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[679][0-9]{8}$").unwrap());

// DNI: 8 digits + control letter. NIE: X/Y/Z + 7 digits + control letter.
// The control letter comes from the official 23-letter sequence; the match
// is syntactic only, the checksum is not verified.
static DNI_NIE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[0-9]{8}[TRWAGMYFPDXBNJZSQVHLCKE]|[XYZ][0-9]{7}[TRWAGMYFPDXBNJZSQVHLCKE])$")
        .unwrap()
});

/// Validates a person's full name: letters (with accents and ñ) and
/// whitespace only. Empty input fails the anchored pattern.
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    if NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName)
    }
}

/// Validates a Spanish mobile/landline number: 9 digits, first digit 6, 7 or 9.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Validates a DNI or NIE document number, case-insensitive, syntax only.
pub fn validate_dni_nie(document: &str) -> Result<(), ValidationError> {
    if DNI_NIE_REGEX.is_match(document) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDni)
    }
}
