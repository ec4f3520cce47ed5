//! Anonymized conversation export models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::course_role::CourseRole;

/// Kind of a conversation. Only questions are exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    Question,
    Note,
    Chat,
}

/// Conversation as read for export. The author role is `None` when the
/// author has since left the course.
#[derive(Debug, Clone)]
pub struct ConversationRecord {
    pub id: Uuid,
    pub reference: String,
    pub conversation_type: ConversationType,
    pub title: String,
    pub author_role: Option<CourseRole>,
    pub created_at: DateTime<Utc>,
}

/// Message as read for export.
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub conversation_id: Uuid,
    pub reference: String,
    pub author_role: Option<CourseRole>,
    pub content_source: String,
    pub created_at: DateTime<Utc>,
}

/// Exported message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportedMessage {
    pub reference: String,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Exported conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportedConversation {
    pub reference: String,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ExportedMessage>,
}

/// Export document for one course.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CourseExport {
    pub course_reference: String,
    pub course_name: String,
    pub exported_at: DateTime<Utc>,
    pub conversations: Vec<ExportedConversation>,
}
