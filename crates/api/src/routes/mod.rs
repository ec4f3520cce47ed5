//! HTTP route handlers.

pub mod courses;
pub mod export;
pub mod health;
pub mod invitations;
pub mod participants;
pub mod tags;

use shared::crypto::parse_reference;

use crate::error::ApiError;

/// Checks a reference taken from the path. Malformed references are
/// reported as missing.
pub(crate) fn reference_param<'a>(value: &'a str, what: &str) -> Result<&'a str, ApiError> {
    parse_reference(value).map_err(|_| ApiError::NotFound(format!("{} not found", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_param() {
        assert_eq!(reference_param("1234567890", "Invitation").unwrap(), "1234567890");
        match reference_param("12ab", "Invitation") {
            Err(ApiError::NotFound(message)) => assert_eq!(message, "Invitation not found"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
