//! Anonymized export of a course's questions.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use domain::models::export::CourseExport;
use domain::services::build_course_export;
use persistence::repositories::ConversationRepository;

use crate::error::ApiError;
use crate::extractors::StaffContext;

pub struct ExportService {
    conversations: ConversationRepository,
}

impl ExportService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            conversations: ConversationRepository::new(pool),
        }
    }

    pub async fn export(
        &self,
        StaffContext(context): StaffContext,
    ) -> Result<CourseExport, ApiError> {
        let course_id = context.course.id;
        let (conversations, messages) = tokio::try_join!(
            self.conversations.list_questions(course_id),
            self.conversations.list_question_messages(course_id),
        )?;

        let export = build_course_export(
            &context.course,
            conversations.into_iter().map(Into::into).collect(),
            messages.into_iter().map(Into::into).collect(),
            Utc::now(),
        );

        info!(
            course_reference = %context.course.reference,
            conversations = export.conversations.len(),
            "Course exported"
        );
        Ok(export)
    }
}
