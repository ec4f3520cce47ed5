//! Course roles.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of a participant (or of the participant an invitation will create).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseRole {
    Student,
    CourseStaff,
}

/// Every valid course role, in display order.
pub const COURSE_ROLES: [CourseRole; 2] = [CourseRole::Student, CourseRole::CourseStaff];

impl CourseRole {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseRole::Student => "student",
            CourseRole::CourseStaff => "course-staff",
        }
    }

    pub fn is_course_staff(&self) -> bool {
        matches!(self, CourseRole::CourseStaff)
    }
}

/// Checks whether `value` names a course role.
pub fn is_valid_role(value: &str) -> bool {
    value.parse::<CourseRole>().is_ok()
}

impl FromStr for CourseRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COURSE_ROLES
            .iter()
            .find(|role| role.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown course role: {}", s))
    }
}

impl std::fmt::Display for CourseRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_role() {
        assert!(is_valid_role("student"));
        assert!(is_valid_role("course-staff"));
        assert!(!is_valid_role("staff"));
        assert!(!is_valid_role("Student"));
        assert!(!is_valid_role(""));
    }

    #[test]
    fn test_from_str_display_agree() {
        for role in COURSE_ROLES {
            assert_eq!(role.to_string().parse::<CourseRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&CourseRole::CourseStaff).unwrap(),
            "\"course-staff\""
        );
        let role: CourseRole = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, CourseRole::Student);
        assert!(serde_json::from_str::<CourseRole>("\"admin\"").is_err());
    }

    #[test]
    fn test_is_course_staff() {
        assert!(CourseRole::CourseStaff.is_course_staff());
        assert!(!CourseRole::Student.is_course_staff());
    }
}
