//! Public reference generation.
//!
//! Courses, participants, invitations and tags are addressed in URLs by a
//! random numeric reference. For invitations the reference is the only
//! capability needed to join, so it is drawn from the OS random source.

use rand::rngs::OsRng;
use rand::Rng;
use thiserror::Error;

/// Length of every generated reference.
pub const REFERENCE_LENGTH: usize = 10;

/// Number of leading characters hidden by [`mask_reference`].
pub const MASKED_PREFIX_LENGTH: usize = 6;

/// Generates a cryptographically random numeric reference.
pub fn generate_reference() -> String {
    generate_numeric(REFERENCE_LENGTH)
}

/// Generates a cryptographically random string of `length` decimal digits.
pub fn generate_numeric(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Why a path segment cannot be a reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("Reference is empty")]
    Empty,

    #[error("Reference must only contain digits")]
    NonNumeric,

    #[error("Reference is too long")]
    TooLong,
}

/// Checks the shape of a reference taken from a URL.
///
/// Conversation and message references are short counters, so only the
/// upper bound is fixed.
pub fn parse_reference(value: &str) -> Result<&str, ReferenceError> {
    if value.is_empty() {
        return Err(ReferenceError::Empty);
    }
    if value.len() > REFERENCE_LENGTH {
        return Err(ReferenceError::TooLong);
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReferenceError::NonNumeric);
    }
    Ok(value)
}

/// Hides the leading characters of a reference for display.
///
/// `"1234567890"` becomes `"••••••7890"`.
pub fn mask_reference(reference: &str) -> String {
    reference
        .chars()
        .enumerate()
        .map(|(i, c)| if i < MASKED_PREFIX_LENGTH { '•' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reference_length() {
        assert_eq!(generate_reference().len(), REFERENCE_LENGTH);
    }

    #[test]
    fn test_generate_reference_is_numeric() {
        let reference = generate_reference();
        assert!(reference.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_reference_unique() {
        let a = generate_reference();
        let b = generate_reference();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_numeric_custom_length() {
        assert_eq!(generate_numeric(4).len(), 4);
        assert!(generate_numeric(0).is_empty());
    }

    #[test]
    fn test_parse_reference() {
        let reference = generate_reference();
        assert_eq!(parse_reference(&reference), Ok(reference.as_str()));
        assert_eq!(parse_reference("42"), Ok("42"));
        assert_eq!(parse_reference(""), Err(ReferenceError::Empty));
        assert_eq!(parse_reference("12a4"), Err(ReferenceError::NonNumeric));
        assert_eq!(parse_reference("12345678901"), Err(ReferenceError::TooLong));
    }

    #[test]
    fn test_mask_reference() {
        assert_eq!(mask_reference("1234567890"), "••••••7890");
    }

    #[test]
    fn test_mask_reference_short() {
        assert_eq!(mask_reference("123"), "•••");
        assert_eq!(mask_reference(""), "");
    }
}
