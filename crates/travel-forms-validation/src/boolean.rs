//! Checkbox rules

use crate::error::ValidationError;

/// Validates a must-be-true checkbox (terms acceptance).
pub fn validate_accepted(value: bool) -> Result<(), ValidationError> {
    if value {
        Ok(())
    } else {
        Err(ValidationError::NotAccepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted() {
        assert!(validate_accepted(true).is_ok());
        assert!(validate_accepted(false).is_err());
    }
}
