//! Removes delivered notifications past their retention window.

use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::services::OutboxDispatcher;

pub struct OutboxPurgeJob {
    dispatcher: OutboxDispatcher,
    retention_days: i64,
}

impl OutboxPurgeJob {
    pub fn new(dispatcher: OutboxDispatcher, retention_days: i64) -> Self {
        Self {
            dispatcher,
            retention_days,
        }
    }
}

#[async_trait::async_trait]
impl Job for OutboxPurgeJob {
    fn name(&self) -> &'static str {
        "outbox_purge"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> Result<(), String> {
        let deleted = self
            .dispatcher
            .purge_delivered(self.retention_days)
            .await
            .map_err(|e| format!("Failed to purge notifications: {}", e))?;

        if deleted > 0 {
            info!(
                deleted = deleted,
                retention_days = self.retention_days,
                "Purged delivered notifications"
            );
        }
        Ok(())
    }
}
