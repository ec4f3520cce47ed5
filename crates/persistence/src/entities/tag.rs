//! Tag entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the tags table.
#[derive(Debug, Clone, FromRow)]
pub struct TagEntity {
    pub id: Uuid,
    pub course_id: Uuid,
    pub reference: String,
    pub order: i32,
    pub name: String,
    pub course_staff_only_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<TagEntity> for domain::models::Tag {
    fn from(entity: TagEntity) -> Self {
        Self {
            id: entity.id,
            course_id: entity.course_id,
            reference: entity.reference,
            order: entity.order,
            name: entity.name,
            course_staff_only_at: entity.course_staff_only_at,
            created_at: entity.created_at,
        }
    }
}
