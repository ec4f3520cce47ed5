//! HTTP client for the live-update server.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use domain::services::{LiveUpdateNotifier, NotifyError};

use crate::config::LiveUpdatesConfig;

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    url: &'a str,
}

/// Posts `{"url": path}` to the live-update server.
///
/// Without a configured endpoint notifications are logged and dropped, which
/// is how development setups without a live-update server run.
#[derive(Clone)]
pub struct HttpLiveUpdateNotifier {
    client: Client,
    endpoint: Option<String>,
}

impl HttpLiveUpdateNotifier {
    pub fn new(config: &LiveUpdatesConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let endpoint = config.url.trim();

        Ok(Self {
            client,
            endpoint: (!endpoint.is_empty()).then(|| endpoint.to_string()),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }
}

#[async_trait::async_trait]
impl LiveUpdateNotifier for HttpLiveUpdateNotifier {
    async fn notify(&self, url: &str) -> Result<(), NotifyError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            debug!(url = %url, "Live updates disabled, notification dropped");
            return Ok(());
        };

        let response = self
            .client
            .post(endpoint)
            .json(&NotificationPayload { url })
            .send()
            .await
            .map_err(|e| NotifyError::Unreachable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = serde_json::to_value(NotificationPayload {
            url: "/courses/1234567890",
        })
        .unwrap();
        assert_eq!(payload, serde_json::json!({"url": "/courses/1234567890"}));
    }

    #[tokio::test]
    async fn test_disabled_notifier_accepts_everything() {
        let notifier = HttpLiveUpdateNotifier::new(&LiveUpdatesConfig::default()).unwrap();
        assert!(!notifier.is_enabled());
        assert!(notifier.notify("/courses/1").await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let config = LiveUpdatesConfig {
            url: "http://127.0.0.1:9/live-updates".to_string(),
            timeout_ms: 200,
            ..LiveUpdatesConfig::default()
        };
        let notifier = HttpLiveUpdateNotifier::new(&config).unwrap();
        assert!(matches!(
            notifier.notify("/courses/1").await,
            Err(NotifyError::Unreachable(_))
        ));
    }
}
