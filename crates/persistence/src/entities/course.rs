//! Course entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the courses table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseEntity {
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

impl From<CourseEntity> for domain::models::Course {
    fn from(entity: CourseEntity) -> Self {
        Self {
            id: entity.id,
            reference: entity.reference,
            name: entity.name,
            year: entity.year,
            term: entity.term,
            institution: entity.institution,
            code: entity.code,
            archived_at: entity.archived_at,
            next_conversation_reference: entity.next_conversation_reference,
            students_may_create_polls_at: entity.students_may_create_polls_at,
            created_at: entity.created_at,
        }
    }
}
