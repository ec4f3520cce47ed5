//! Invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::course_participant::CourseRoleDb;

/// Database row mapping for the invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub course_id: Uuid,
    pub reference: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub course_role: CourseRoleDb,
    pub created_at: DateTime<Utc>,
}

impl From<InvitationEntity> for domain::models::Invitation {
    fn from(entity: InvitationEntity) -> Self {
        Self {
            id: entity.id,
            course_id: entity.course_id,
            reference: entity.reference,
            expires_at: entity.expires_at,
            used_at: entity.used_at,
            email: entity.email,
            name: entity.name,
            course_role: entity.course_role.into(),
            created_at: entity.created_at,
        }
    }
}
