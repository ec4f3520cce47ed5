//! Course participant entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{AccentColor, CourseRole};

/// Database enum for course_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "course_role", rename_all = "kebab-case")]
pub enum CourseRoleDb {
    Student,
    CourseStaff,
}

impl From<CourseRoleDb> for CourseRole {
    fn from(db: CourseRoleDb) -> Self {
        match db {
            CourseRoleDb::Student => Self::Student,
            CourseRoleDb::CourseStaff => Self::CourseStaff,
        }
    }
}

impl From<CourseRole> for CourseRoleDb {
    fn from(domain: CourseRole) -> Self {
        match domain {
            CourseRole::Student => Self::Student,
            CourseRole::CourseStaff => Self::CourseStaff,
        }
    }
}

/// Database enum for accent_color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "accent_color", rename_all = "lowercase")]
pub enum AccentColorDb {
    Red,
    Yellow,
    Emerald,
    Sky,
    Violet,
    Pink,
}

impl From<AccentColorDb> for AccentColor {
    fn from(db: AccentColorDb) -> Self {
        match db {
            AccentColorDb::Red => Self::Red,
            AccentColorDb::Yellow => Self::Yellow,
            AccentColorDb::Emerald => Self::Emerald,
            AccentColorDb::Sky => Self::Sky,
            AccentColorDb::Violet => Self::Violet,
            AccentColorDb::Pink => Self::Pink,
        }
    }
}

impl From<AccentColor> for AccentColorDb {
    fn from(domain: AccentColor) -> Self {
        match domain {
            AccentColor::Red => Self::Red,
            AccentColor::Yellow => Self::Yellow,
            AccentColor::Emerald => Self::Emerald,
            AccentColor::Sky => Self::Sky,
            AccentColor::Violet => Self::Violet,
            AccentColor::Pink => Self::Pink,
        }
    }
}

/// Database row mapping for the course_participants table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseParticipantEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub reference: String,
    pub course_role: CourseRoleDb,
    pub accent_color: AccentColorDb,
    pub most_recently_visited_conversation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<CourseParticipantEntity> for domain::models::CourseParticipant {
    fn from(entity: CourseParticipantEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            course_id: entity.course_id,
            reference: entity.reference,
            course_role: entity.course_role.into(),
            accent_color: entity.accent_color.into(),
            most_recently_visited_conversation_id: entity.most_recently_visited_conversation_id,
            created_at: entity.created_at,
        }
    }
}

/// Participant joined with user details for list responses.
#[derive(Debug, Clone, FromRow)]
pub struct CourseParticipantWithUserEntity {
    pub reference: String,
    pub course_role: CourseRoleDb,
    pub accent_color: AccentColorDb,
    pub created_at: DateTime<Utc>,
    // User details
    pub user_name: String,
    pub user_email: String,
}

impl From<CourseParticipantWithUserEntity> for domain::models::participant::ParticipantResponse {
    fn from(entity: CourseParticipantWithUserEntity) -> Self {
        Self {
            reference: entity.reference,
            name: entity.user_name,
            email: entity.user_email,
            course_role: entity.course_role.into(),
            accent_color: entity.accent_color.into(),
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{ACCENT_COLORS, COURSE_ROLES};

    #[test]
    fn test_course_role_conversion() {
        assert_eq!(CourseRole::from(CourseRoleDb::CourseStaff), CourseRole::CourseStaff);
        for role in COURSE_ROLES {
            assert_eq!(CourseRole::from(CourseRoleDb::from(role)), role);
        }
    }

    #[test]
    fn test_accent_color_conversion() {
        for color in ACCENT_COLORS {
            assert_eq!(AccentColor::from(AccentColorDb::from(color)), color);
        }
    }
}
