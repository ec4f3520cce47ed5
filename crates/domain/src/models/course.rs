//! Course domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::{validate_not_blank, MAX_NAME_LENGTH};

use super::course_role::CourseRole;
use crate::errors::DomainError;

/// A course. Courses are never deleted, only archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: Uuid,
    pub reference: String,
    pub name: String,
    pub year: Option<String>,
    pub term: Option<String>,
    pub institution: Option<String>,
    pub code: Option<String>,
    pub archived_at: Option<DateTime<Utc>>,
    pub next_conversation_reference: i32,
    pub students_may_create_polls_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Canonical path of the course, also used as the live-update key.
    pub fn path(&self) -> String {
        course_path(&self.reference)
    }

    /// Rejects the mutation when the course is archived.
    pub fn ensure_not_archived(&self) -> Result<(), DomainError> {
        if self.is_archived() {
            Err(DomainError::CourseArchived {
                course_reference: self.reference.clone(),
            })
        } else {
            Ok(())
        }
    }
}

/// Builds the canonical path for a course reference.
pub fn course_path(course_reference: &str) -> String {
    format!("/courses/{}", course_reference)
}

/// Request to create a course.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateCourseRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(length(max = 50, message = "Year must be at most 50 characters"))]
    pub year: Option<String>,

    #[validate(length(max = 50, message = "Term must be at most 50 characters"))]
    pub term: Option<String>,

    #[validate(length(max = 200, message = "Institution must be at most 200 characters"))]
    pub institution: Option<String>,

    #[validate(length(max = 50, message = "Code must be at most 50 characters"))]
    pub code: Option<String>,
}

impl CreateCourseRequest {
    /// Trimmed information for the new course; blank optional fields are dropped.
    pub fn information(&self) -> CourseInformation {
        CourseInformation {
            name: self.name.trim().to_string(),
            year: self.year.as_deref().and_then(normalize_optional),
            term: self.term.as_deref().and_then(normalize_optional),
            institution: self.institution.as_deref().and_then(normalize_optional),
            code: self.code.as_deref().and_then(normalize_optional),
        }
    }
}

/// Request to update course information. Missing fields keep their value,
/// blank optional fields are cleared.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateCourseRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(length(max = 50, message = "Year must be at most 50 characters"))]
    pub year: Option<String>,

    #[validate(length(max = 50, message = "Term must be at most 50 characters"))]
    pub term: Option<String>,

    #[validate(length(max = 200, message = "Institution must be at most 200 characters"))]
    pub institution: Option<String>,

    #[validate(length(max = 50, message = "Code must be at most 50 characters"))]
    pub code: Option<String>,
}

/// Course information after applying an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseInformation {
    pub name: String,
    pub year: Option<String>,
    pub term: Option<String>,
    pub institution: Option<String>,
    pub code: Option<String>,
}

impl UpdateCourseRequest {
    /// Merges the request onto the current course information.
    pub fn apply_to(&self, course: &Course) -> CourseInformation {
        fn merge(update: &Option<String>, current: &Option<String>) -> Option<String> {
            match update {
                Some(value) => normalize_optional(value),
                None => current.clone(),
            }
        }

        CourseInformation {
            name: self
                .name
                .as_ref()
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| course.name.clone()),
            year: merge(&self.year, &course.year),
            term: merge(&self.term, &course.term),
            institution: merge(&self.institution, &course.institution),
            code: merge(&self.code, &course.code),
        }
    }
}

/// Trims an optional text field, mapping blank input to `None`.
pub fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_NAME_LENGTH).collect())
    }
}

/// Request to toggle whether students may create polls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdatePollsSettingRequest {
    pub students_may_create_polls: bool,
}

/// Course response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CourseResponse {
    pub reference: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    pub students_may_create_polls: bool,
    pub created_at: DateTime<Utc>,
    /// Role of the requesting participant, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_role: Option<CourseRole>,
}

impl CourseResponse {
    pub fn from_course(course: Course, viewer_role: Option<CourseRole>) -> Self {
        Self {
            archived: course.is_archived(),
            students_may_create_polls: course.students_may_create_polls_at.is_some(),
            reference: course.reference,
            name: course.name,
            year: course.year,
            term: course.term,
            institution: course.institution,
            code: course.code,
            archived_at: course.archived_at,
            created_at: course.created_at,
            viewer_role,
        }
    }
}
