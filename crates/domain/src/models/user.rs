//! User domain models.
//!
//! Users are owned by the sign-in subsystem. Courses only read them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub reference: String,
    pub email: String,
    pub name: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_email_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Case-insensitive email comparison.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn user(email: String) -> User {
        User {
            id: Uuid::new_v4(),
            reference: "1000000001".to_string(),
            email,
            name: Name().fake(),
            email_verified_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_email_ignores_case() {
        let email: String = SafeEmail().fake();
        let u = user(email.clone());
        assert!(u.has_email(&email.to_uppercase()));
        assert!(u.has_email(&format!("  {}  ", email)));
        assert!(!u.has_email("someone-else@example.org"));
    }

    #[test]
    fn test_email_verified() {
        let mut u = user(SafeEmail().fake());
        assert!(!u.is_email_verified());
        u.email_verified_at = Some(Utc::now());
        assert!(u.is_email_verified());
    }
}
