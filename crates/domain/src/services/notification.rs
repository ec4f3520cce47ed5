//! Live-update notifications.
//!
//! After a course changes, clients viewing it are told to refresh. Delivery
//! goes through the `course_notifications` outbox, and the dispatcher hands
//! each row to a [`LiveUpdateNotifier`].

use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from a live-update delivery attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Live-update server unreachable: {0}")]
    Unreachable(String),

    #[error("Live-update server rejected notification with status {0}")]
    Rejected(u16),
}

/// Tells subscribers of `url` that the page changed.
#[async_trait::async_trait]
pub trait LiveUpdateNotifier: Send + Sync {
    async fn notify(&self, url: &str) -> Result<(), NotifyError>;
}

/// Notifier for development and testing.
///
/// Logs and records URLs instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct MockLiveUpdateNotifier {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockLiveUpdateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier that fails every delivery.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// URLs delivered so far.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LiveUpdateNotifier for MockLiveUpdateNotifier {
    async fn notify(&self, url: &str) -> Result<(), NotifyError> {
        if self.simulate_failure {
            tracing::warn!(url = %url, "Mock live-update notifier simulating failure");
            return Err(NotifyError::Unreachable("Simulated failure".to_string()));
        }

        tracing::info!(url = %url, "Mock: Would notify live-update subscribers");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(url.to_string());
        }
        Ok(())
    }
}
