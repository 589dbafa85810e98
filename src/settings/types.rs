use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root settings container for the CMS server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub leads: LeadSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address for the HTTP server (host:port).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Upper bound on in-flight requests (default: 64).
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

/// Location of the site configuration module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Path of the generated module. The backup lives next to it as `<path>.backup`.
    #[serde(default = "default_module_path")]
    pub module_path: PathBuf,
}

/// Outbound notification sent after every successful content update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifySettings {
    /// Webhook receiving the notification. Notifications are disabled when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Value of the `source` field in every payload.
    #[serde(default = "default_notify_source")]
    pub source: String,
    /// Per-attempt timeout in seconds (default: 5).
    #[serde(default = "default_notify_timeout")]
    pub timeout_seconds: u32,
    /// Retry attempts after the first failure (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff in milliseconds for retry (default: 100).
    #[serde(default = "default_retry_backoff_base_ms")]
    pub retry_backoff_base_ms: u64,
    /// Pending notifications kept before new ones are dropped (default: 64).
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Document keys copied to the top level of the payload when present.
    #[serde(default = "default_highlight_keys")]
    pub highlight_keys: Vec<String>,
}

/// Lead-capture relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSettings {
    /// Webhook receiving lead submissions.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Request timeout in seconds (default: 10).
    #[serde(default = "default_lead_timeout")]
    pub timeout_seconds: u32,
}

impl NotifySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    pub fn retry_backoff_base(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_base_ms)
    }
}

impl LeadSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_concurrent_requests() -> usize {
    64
}

fn default_module_path() -> PathBuf {
    PathBuf::from("src/config/siteConfig.js")
}

fn default_notify_source() -> String {
    "cms-admin".to_string()
}

fn default_notify_timeout() -> u32 {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_base_ms() -> u64 {
    100
}

fn default_queue_capacity() -> usize {
    64
}

fn default_highlight_keys() -> Vec<String> {
    ["property", "contactInfo", "branding", "formQuestions"]
        .iter()
        .map(|key| key.to_string())
        .collect()
}

fn default_lead_timeout() -> u32 {
    10
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            module_path: default_module_path(),
        }
    }
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            source: default_notify_source(),
            timeout_seconds: default_notify_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_base_ms: default_retry_backoff_base_ms(),
            queue_capacity: default_queue_capacity(),
            highlight_keys: default_highlight_keys(),
        }
    }
}

impl Default for LeadSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_seconds: default_lead_timeout(),
        }
    }
}
