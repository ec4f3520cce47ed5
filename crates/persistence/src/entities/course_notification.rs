//! Course notification outbox entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the course_notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseNotificationEntity {
    pub id: Uuid,
    pub course_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub last_error: Option<String>,
    /// Set while a dispatcher is delivering the row.
    pub claimed_until: Option<DateTime<Utc>>,
}
