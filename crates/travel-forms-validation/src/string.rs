//! Generic string rules

use crate::error::ValidationError;

/// Validates that a value is present (non-empty after trimming).
pub fn validate_required(s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        Err(ValidationError::Required)
    } else {
        Ok(())
    }
}

/// Validates minimum character count.
pub fn validate_min_length(s: &str, min: usize) -> Result<(), ValidationError> {
    if s.chars().count() >= min {
        Ok(())
    } else {
        Err(ValidationError::TooShort)
    }
}
