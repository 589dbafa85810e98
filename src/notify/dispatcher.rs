//! Background delivery of update notifications.
//!
//! Notifications go through a bounded queue to a single worker task, so
//! webhook latency and failures never reach the request path. Each
//! payload is retried with exponential backoff and then dropped.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::forwarder::{ForwardError, WebhookForwarder};
use super::payload::NotificationPayload;
use crate::settings::NotifySettings;
use crate::site::Document;

/// Handle for queueing notifications. Cheap to clone.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: Option<mpsc::Sender<NotificationPayload>>,
    source: Arc<str>,
    highlight_keys: Arc<[String]>,
}

impl NotificationDispatcher {
    /// Start the delivery worker on the current tokio runtime.
    ///
    /// Without a webhook URL the dispatcher is disabled and drops every
    /// notification.
    pub fn spawn(settings: &NotifySettings) -> Result<Self, ForwardError> {
        let Some(url) = settings.webhook_url.clone() else {
            tracing::info!("No notification webhook configured, update notifications disabled");
            return Ok(Self::disabled_with(settings));
        };

        let forwarder = WebhookForwarder::new(settings.timeout())?;
        let (sender, receiver) = mpsc::channel(settings.queue_capacity);
        let worker = DeliveryWorker {
            forwarder,
            url,
            max_retries: settings.max_retries,
            backoff_base: settings.retry_backoff_base(),
            receiver,
        };
        tokio::spawn(worker.run());

        Ok(Self {
            sender: Some(sender),
            source: Arc::from(settings.source.as_str()),
            highlight_keys: Arc::from(settings.highlight_keys.clone()),
        })
    }

    /// A dispatcher that never sends anything.
    pub fn disabled() -> Self {
        Self::disabled_with(&NotifySettings::default())
    }

    fn disabled_with(settings: &NotifySettings) -> Self {
        Self {
            sender: None,
            source: Arc::from(settings.source.as_str()),
            highlight_keys: Arc::from(settings.highlight_keys.clone()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queue a notification for an update of `section`.
    ///
    /// Never blocks and never fails; a full or closed queue is logged.
    pub fn notify_update(&self, section: &str, config_file: String, config: Document) {
        let Some(sender) = &self.sender else {
            tracing::debug!(section, "Notification skipped, dispatcher disabled");
            return;
        };

        let payload = NotificationPayload::config_update(
            section,
            &self.source,
            config_file,
            config,
            &self.highlight_keys,
        );

        match sender.try_send(payload) {
            Ok(()) => tracing::debug!(section, "Notification queued"),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(section, "Notification queue full, dropping notification")
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(section, "Notification worker stopped, dropping notification")
            }
        }
    }
}

struct DeliveryWorker {
    forwarder: WebhookForwarder,
    url: String,
    max_retries: u32,
    backoff_base: Duration,
    receiver: mpsc::Receiver<NotificationPayload>,
}

impl DeliveryWorker {
    async fn run(mut self) {
        while let Some(payload) = self.receiver.recv().await {
            match self.deliver(&payload).await {
                Ok(status) => tracing::info!(
                    section = %payload.section,
                    status = status.as_u16(),
                    "Update notification delivered"
                ),
                Err(e) => tracing::warn!(
                    section = %payload.section,
                    error = %e,
                    "Update notification failed"
                ),
            }
        }
        tracing::debug!("Notification worker exiting");
    }

    async fn deliver(&self, payload: &NotificationPayload) -> Result<StatusCode, ForwardError> {
        let mut attempt = 0;
        loop {
            match self.forwarder.post_json(&self.url, payload).await {
                Ok(status) => return Ok(status),
                Err(e) if attempt < self.max_retries => {
                    let delay = backoff_delay(self.backoff_base, attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Notification attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}
