//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::{ValidateEmail, ValidationError};

/// Maximum length of free-text names (course names, tag names, invitee names).
pub const MAX_NAME_LENGTH: usize = 200;

/// Validates that a timestamp lies strictly in the future.
pub fn validate_future_timestamp(timestamp: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *timestamp > Utc::now() {
        Ok(())
    } else {
        let mut err = ValidationError::new("timestamp_not_future");
        err.message = Some("Timestamp must be in the future".into());
        Err(err)
    }
}

/// Validates that a string has content after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Checks that a string has the shape of an email address.
pub fn is_email_shape(value: &str) -> bool {
    !value.chars().any(char::is_whitespace) && value.validate_email()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_future_timestamp() {
        assert!(validate_future_timestamp(&(Utc::now() + Duration::hours(1))).is_ok());
        assert!(validate_future_timestamp(&(Utc::now() - Duration::seconds(1))).is_err());
    }

    #[test]
    fn test_validate_future_timestamp_error_message() {
        let err = validate_future_timestamp(&(Utc::now() - Duration::days(3))).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Timestamp must be in the future"
        );
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Homework").is_ok());
        assert!(validate_not_blank("  x ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \n\t ").is_err());
    }

    #[test]
    fn test_is_email_shape() {
        assert!(is_email_shape("scott@courselore.org"));
        assert!(is_email_shape("first.last+tag@example.co.uk"));
    }

    #[test]
    fn test_is_email_shape_rejects_malformed() {
        assert!(!is_email_shape("not-an-email"));
        assert!(!is_email_shape("two@@example.com"));
        assert!(!is_email_shape("spaced out@example.com"));
        assert!(!is_email_shape(""));
    }
}
