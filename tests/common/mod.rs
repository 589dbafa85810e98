//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_webhook;

use listing_cms::notify::NotificationDispatcher;
use listing_cms::settings::{NotifySettings, Settings};
use listing_cms::site::{Document, ModuleStore};
use listing_cms::update::UpdateService;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp directory holding a `siteConfig.js` path (file not created).
pub fn temp_module() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let module_path = temp_dir.path().join("siteConfig.js");
    (temp_dir, module_path)
}

/// Update service with notifications disabled.
pub fn offline_service(module_path: &Path) -> UpdateService {
    UpdateService::new(
        ModuleStore::new(module_path),
        NotificationDispatcher::disabled(),
    )
}

/// Notification settings pointing at `url` with fast retries.
pub fn notify_settings(url: &str) -> NotifySettings {
    NotifySettings {
        webhook_url: Some(url.to_string()),
        timeout_seconds: 1,
        max_retries: 1,
        retry_backoff_base_ms: 10,
        ..NotifySettings::default()
    }
}

/// Settings bound to an ephemeral localhost port.
pub fn test_settings(module_path: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.server.bind_addr = "127.0.0.1:0".to_string();
    settings.store.module_path = module_path.to_path_buf();
    settings
}

/// Unwrap a `json!` object into a document.
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
