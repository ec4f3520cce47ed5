//! Invitation emails.
//!
//! Emails are never sent from a request. They are queued as rows in
//! `send_email_jobs` inside the caller's transaction, and after commit the
//! mail worker is pinged so it picks them up without waiting for its poll.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use sqlx::PgConnection;
use thiserror::Error;
use tracing::{debug, warn};

use domain::models::email_job::{job_window, mailbox};
use domain::models::invitation::invitation_link;
use domain::models::{Course, CourseRole, Invitation, MailOptions};
use persistence::repositories::SendEmailJobRepository;

use crate::config::{Config, EmailConfig};

/// Mail worker ping timeout.
const WORKER_PING_TIMEOUT_SECS: u64 = 5;

/// Errors from pinging the mail worker.
#[derive(Debug, Error)]
pub enum EmailWorkerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Mail worker responded with status {0}")]
    Rejected(u16),
}

/// Wakes the external mail worker.
#[derive(Clone)]
pub struct EmailWorkerClient {
    client: Client,
    ping_url: Option<Arc<str>>,
}

impl EmailWorkerClient {
    /// Builds the client. An empty `worker_ping_url` disables pings.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailWorkerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WORKER_PING_TIMEOUT_SECS))
            .build()?;
        let url = config.worker_ping_url.trim();

        Ok(Self {
            client,
            ping_url: (!url.is_empty()).then(|| Arc::from(url)),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.ping_url.is_some()
    }

    /// Sends one ping and waits for the answer.
    pub async fn ping(&self) -> Result<(), EmailWorkerError> {
        let Some(url) = self.ping_url.as_deref() else {
            return Ok(());
        };

        let response = self.client.post(url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(EmailWorkerError::Rejected(response.status().as_u16()))
        }
    }

    /// Pings the worker without blocking the caller. Failures are only
    /// logged; the worker still finds the jobs on its next poll.
    pub fn ping_in_background(&self) {
        if !self.is_enabled() {
            debug!("Mail worker ping disabled, jobs wait for the next poll");
            return;
        }

        let worker = self.clone();
        tokio::spawn(async move {
            if let Err(e) = worker.ping().await {
                warn!(error = %e, "Failed to ping mail worker");
            }
        });
    }
}

/// Escapes text for inclusion in HTML.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn role_label(role: CourseRole) -> &'static str {
    match role {
        CourseRole::Student => "Student",
        CourseRole::CourseStaff => "Course Staff",
    }
}

/// Composes the invitation email for an email invitation.
pub fn invitation_mail(
    config: &Config,
    course: &Course,
    invitation: &Invitation,
    to: &str,
) -> MailOptions {
    let link = invitation_link(
        &config.server.app_base_url,
        &course.reference,
        &invitation.reference,
    );
    let course_name = escape_html(&course.name);

    let expiration = match invitation.expires_at {
        Some(expires_at) => format!(
            "This invitation expires on {}.",
            expires_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => "This invitation does not expire.".to_string(),
    };

    let html = format!(
        r#"<p>You have been invited to {course_name} as {role}.</p>
<p><a href="{link}">{link}</a></p>
<p><small>{expiration} If you were not expecting this invitation, you can ignore this email.</small></p>"#,
        course_name = course_name,
        role = role_label(invitation.course_role),
        link = escape_html(&link),
        expiration = expiration,
    );

    MailOptions {
        from: mailbox(Some(&config.email.sender_name), &config.email.sender_email),
        to: mailbox(invitation.name.as_deref(), to),
        subject: format!("Invitation to {}", course.name),
        html,
    }
}

/// Queues the invitation email inside the caller's transaction.
///
/// Link invitations have no recipient and are skipped.
pub async fn enqueue_invitation_email(
    jobs: &SendEmailJobRepository,
    conn: &mut PgConnection,
    config: &Config,
    course: &Course,
    invitation: &Invitation,
) -> Result<bool, sqlx::Error> {
    let Some(email) = invitation.email.as_deref() else {
        return Ok(false);
    };

    let mail = invitation_mail(config, course, invitation, email);
    let (start_at, expires_at) = job_window(
        Utc::now(),
        ChronoDuration::minutes(config.email.job_ttl_minutes),
    );
    let job = jobs.enqueue(conn, start_at, expires_at, &mail).await?;
    debug!(
        job_id = %job.id,
        invitation = %invitation.masked_reference(),
        "Invitation email queued"
    );
    Ok(true)
}
