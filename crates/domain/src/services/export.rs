//! Anonymized export of question conversations.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::export::{
    ConversationRecord, ConversationType, CourseExport, ExportedConversation, ExportedMessage,
    MessageRecord,
};
use crate::models::{Course, CourseRole};

lazy_static! {
    static ref MENTION: Regex = Regex::new(r"(?P<lead>^|[^\w@.])@(?P<handle>[\w-]+)").unwrap();
}

/// Mentions that address a group rather than a person.
pub const SPECIAL_MENTIONS: [&str; 3] = ["everyone", "staff", "students"];

pub const ANONYMOUS_MENTION: &str = "@anonymous";

/// Replaces personal `@mentions` with `@anonymous`.
pub fn anonymize_mentions(content: &str) -> String {
    MENTION
        .replace_all(content, |captures: &Captures| {
            let handle = &captures["handle"];
            if SPECIAL_MENTIONS.contains(&handle) {
                captures[0].to_string()
            } else {
                format!("{}{}", &captures["lead"], ANONYMOUS_MENTION)
            }
        })
        .into_owned()
}

/// Display label for an author.
pub fn author_label(role: Option<CourseRole>) -> &'static str {
    match role {
        Some(CourseRole::CourseStaff) => "Staff",
        Some(CourseRole::Student) => "Student",
        None => "Former participant",
    }
}

/// Assembles the export. Non-question conversations are left out and
/// conversations and messages are ordered by creation.
pub fn build_course_export(
    course: &Course,
    conversations: Vec<ConversationRecord>,
    messages: Vec<MessageRecord>,
    exported_at: DateTime<Utc>,
) -> CourseExport {
    let mut messages_by_conversation: HashMap<Uuid, Vec<MessageRecord>> = HashMap::new();
    for message in messages {
        messages_by_conversation
            .entry(message.conversation_id)
            .or_default()
            .push(message);
    }

    let mut questions: Vec<ConversationRecord> = conversations
        .into_iter()
        .filter(|c| c.conversation_type == ConversationType::Question)
        .collect();
    questions.sort_by_key(|c| c.created_at);

    let conversations = questions
        .into_iter()
        .map(|conversation| {
            let mut messages = messages_by_conversation
                .remove(&conversation.id)
                .unwrap_or_default();
            messages.sort_by_key(|m| m.created_at);

            ExportedConversation {
                reference: conversation.reference,
                title: anonymize_mentions(&conversation.title),
                author: author_label(conversation.author_role).to_string(),
                created_at: conversation.created_at,
                messages: messages
                    .into_iter()
                    .map(|message| ExportedMessage {
                        reference: message.reference,
                        author: author_label(message.author_role).to_string(),
                        content: anonymize_mentions(&message.content_source),
                        created_at: message.created_at,
                    })
                    .collect(),
            }
        })
        .collect();

    CourseExport {
        course_reference: course.reference.clone(),
        course_name: course.name.clone(),
        exported_at,
        conversations,
    }
}
