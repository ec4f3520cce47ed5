//! Course tag domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_not_blank;

/// A tag used to organize conversations. Tags form a dense zero-based order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Uuid,
    pub course_id: Uuid,
    pub reference: String,
    pub order: i32,
    pub name: String,
    pub course_staff_only_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn is_course_staff_only(&self) -> bool {
        self.course_staff_only_at.is_some()
    }
}

/// One entry of the desired tag list. Entries without a reference are new.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct TagInput {
    pub reference: Option<String>,

    #[validate(
        length(min = 1, max = 200, message = "Tag name must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[serde(default)]
    pub is_course_staff_only: bool,
}

/// Replaces the whole tag list of a course. The position in `tags` is the order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ReplaceTagsRequest {
    #[validate(length(max = 500, message = "A course can have at most 500 tags"))]
    #[validate(nested)]
    pub tags: Vec<TagInput>,
}

/// Tag response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TagResponse {
    pub reference: String,
    pub order: i32,
    pub name: String,
    pub is_course_staff_only: bool,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            is_course_staff_only: tag.is_course_staff_only(),
            reference: tag.reference,
            order: tag.order,
            name: tag.name,
        }
    }
}

/// Response for listing tags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTagsResponse {
    pub tags: Vec<TagResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_request_defaults_staff_flag() {
        let request: ReplaceTagsRequest =
            serde_json::from_str(r#"{"tags":[{"name":"Homework"}]}"#).unwrap();
        assert_eq!(request.tags.len(), 1);
        assert!(!request.tags[0].is_course_staff_only);
        assert!(request.tags[0].reference.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_replace_request_rejects_blank_name() {
        let request: ReplaceTagsRequest = serde_json::from_str(
            r#"{"tags":[{"name":"Homework"},{"reference":"12","name":"  "}]}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_replace_request_rejects_too_many_tags() {
        let tags = (0..501)
            .map(|i| TagInput {
                reference: None,
                name: format!("Tag {}", i),
                is_course_staff_only: false,
            })
            .collect();
        let errors = ReplaceTagsRequest { tags }.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("tags"));
    }

    #[test]
    fn test_empty_list_is_valid() {
        let request: ReplaceTagsRequest = serde_json::from_str(r#"{"tags":[]}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_tag_response_from_tag() {
        let tag = Tag {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            reference: "42".to_string(),
            order: 3,
            name: "Exams".to_string(),
            course_staff_only_at: Some(Utc::now()),
            created_at: Utc::now(),
        };
        let response = TagResponse::from(tag);
        assert!(response.is_course_staff_only);
        assert_eq!(response.order, 3);
    }
}
