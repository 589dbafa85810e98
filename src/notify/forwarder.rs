//! Outbound JSON webhook delivery shared by update notifications and the
//! lead relay.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// Errors from delivering a JSON payload to a webhook.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("Webhook request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Connection or protocol failure
    #[error("Webhook request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Webhook answered with a non-2xx status
    #[error("Webhook responded with status {status}")]
    Status { status: StatusCode },
}

/// POSTs JSON payloads to webhooks. Any 2xx answer counts as delivered.
#[derive(Debug, Clone)]
pub struct WebhookForwarder {
    client: Client,
    timeout: Duration,
}

impl WebhookForwarder {
    pub fn new(timeout: Duration) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ForwardError::Client)?;
        Ok(Self { client, timeout })
    }

    pub async fn post_json<T>(&self, url: &str, payload: &T) -> Result<StatusCode, ForwardError>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(ForwardError::Status { status })
        }
    }

    fn classify(&self, err: reqwest::Error) -> ForwardError {
        if err.is_timeout() {
            ForwardError::Timeout {
                duration: self.timeout,
            }
        } else {
            ForwardError::Transport(err)
        }
    }
}
