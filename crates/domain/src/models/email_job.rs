//! Outgoing email job models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Message handed to the mail worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailOptions {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivery window for a job created at `now`. The worker picks up jobs
/// whose window contains the current time.
pub fn job_window(now: DateTime<Utc>, ttl: Duration) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + ttl)
}

/// Formats an RFC 5322 mailbox, quoting the display name.
pub fn mailbox(name: Option<&str>, email: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("\"{}\" <{}>", name.replace('"', "'"), email),
        None => email.to_string(),
    }
}
