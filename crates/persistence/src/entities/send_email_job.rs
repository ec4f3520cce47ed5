//! Send email job entity (database row mapping).

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the send_email_jobs table.
#[derive(Debug, Clone, FromRow)]
pub struct SendEmailJobEntity {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub start_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub mail_options: JsonValue,
}
