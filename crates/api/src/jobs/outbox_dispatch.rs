//! Delivers pending course-changed notifications.

use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::services::OutboxDispatcher;

/// Drains the notification outbox every `interval_secs`.
pub struct OutboxDispatchJob {
    dispatcher: OutboxDispatcher,
    interval_secs: u64,
}

impl OutboxDispatchJob {
    pub fn new(dispatcher: OutboxDispatcher, interval_secs: u64) -> Self {
        Self {
            dispatcher,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for OutboxDispatchJob {
    fn name(&self) -> &'static str {
        "outbox_dispatch"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self
            .dispatcher
            .dispatch_pending()
            .await
            .map_err(|e| format!("Failed to dispatch notifications: {}", e))?;

        if !summary.is_empty() {
            info!(
                delivered = summary.delivered,
                failed = summary.failed,
                "Outbox dispatch finished"
            );
        }
        Ok(())
    }
}
