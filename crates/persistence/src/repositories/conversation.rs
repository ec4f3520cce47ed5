//! Read-only queries over conversations for the course export.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ConversationExportEntity, MessageExportEntity};
use crate::metrics::QueryTimer;

/// Repository for conversation reads.
#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    /// Creates a new conversation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists the question conversations of a course with their author's role.
    pub async fn list_questions(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<ConversationExportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_question_conversations");
        let result = sqlx::query_as::<_, ConversationExportEntity>(
            r#"
            SELECT c.id, c.reference, c.type AS conversation_type, c.title,
                   cp.course_role AS author_role, c.created_at
            FROM conversations c
            LEFT JOIN course_participants cp ON cp.id = c.author_course_participant_id
            WHERE c.course_id = $1 AND c.type = 'question'
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists the messages of every question conversation in a course.
    pub async fn list_question_messages(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<MessageExportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_question_messages");
        let result = sqlx::query_as::<_, MessageExportEntity>(
            r#"
            SELECT m.conversation_id, m.reference, cp.course_role AS author_role,
                   m.content_source, m.created_at
            FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            LEFT JOIN course_participants cp ON cp.id = m.author_course_participant_id
            WHERE c.course_id = $1 AND c.type = 'question'
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
