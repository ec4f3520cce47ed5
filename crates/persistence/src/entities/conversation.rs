//! Conversation and message rows read for export.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::export::{ConversationRecord, ConversationType, MessageRecord};

use super::course_participant::CourseRoleDb;

/// Database enum for conversation_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "conversation_type", rename_all = "lowercase")]
pub enum ConversationTypeDb {
    Question,
    Note,
    Chat,
}

impl From<ConversationTypeDb> for ConversationType {
    fn from(db: ConversationTypeDb) -> Self {
        match db {
            ConversationTypeDb::Question => Self::Question,
            ConversationTypeDb::Note => Self::Note,
            ConversationTypeDb::Chat => Self::Chat,
        }
    }
}

/// Conversation with its author's current role, if the author is still a participant.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationExportEntity {
    pub id: Uuid,
    pub reference: String,
    pub conversation_type: ConversationTypeDb,
    pub title: String,
    pub author_role: Option<CourseRoleDb>,
    pub created_at: DateTime<Utc>,
}

impl From<ConversationExportEntity> for ConversationRecord {
    fn from(entity: ConversationExportEntity) -> Self {
        Self {
            id: entity.id,
            reference: entity.reference,
            conversation_type: entity.conversation_type.into(),
            title: entity.title,
            author_role: entity.author_role.map(Into::into),
            created_at: entity.created_at,
        }
    }
}

/// Message with its author's current role.
#[derive(Debug, Clone, FromRow)]
pub struct MessageExportEntity {
    pub conversation_id: Uuid,
    pub reference: String,
    pub author_role: Option<CourseRoleDb>,
    pub content_source: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageExportEntity> for MessageRecord {
    fn from(entity: MessageExportEntity) -> Self {
        Self {
            conversation_id: entity.conversation_id,
            reference: entity.reference,
            author_role: entity.author_role.map(Into::into),
            content_source: entity.content_source,
            created_at: entity.created_at,
        }
    }
}
