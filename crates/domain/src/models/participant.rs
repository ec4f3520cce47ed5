//! Course participant domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::accent_color::AccentColor;
use super::course_role::CourseRole;

/// Membership of a user in a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseParticipant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub reference: String,
    pub course_role: CourseRole,
    pub accent_color: AccentColor,
    pub most_recently_visited_conversation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl CourseParticipant {
    pub fn is_course_staff(&self) -> bool {
        self.course_role.is_course_staff()
    }
}

/// Request to change a participant. At least one field must be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateParticipantRequest {
    pub course_role: Option<CourseRole>,
    pub accent_color: Option<AccentColor>,
}

impl UpdateParticipantRequest {
    pub fn is_empty(&self) -> bool {
        self.course_role.is_none() && self.accent_color.is_none()
    }
}

/// Participant as listed to other course members.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ParticipantResponse {
    pub reference: String,
    pub name: String,
    pub email: String,
    pub course_role: CourseRole,
    pub accent_color: AccentColor,
    pub created_at: DateTime<Utc>,
}

/// Response for listing participants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListParticipantsResponse {
    pub participants: Vec<ParticipantResponse>,
    pub course_staff_count: usize,
}

impl ListParticipantsResponse {
    pub fn new(participants: Vec<ParticipantResponse>) -> Self {
        let course_staff_count = participants
            .iter()
            .filter(|p| p.course_role.is_course_staff())
            .count();
        Self {
            participants,
            course_staff_count,
        }
    }
}
