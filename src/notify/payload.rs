use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::site::Document;

pub const ACTION_CONFIG_UPDATE: &str = "config_update";

/// Body POSTed to the notification webhook after a content update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub timestamp: DateTime<Utc>,
    pub section: String,
    pub action: String,
    pub source: String,
    /// Full module text as written to disk.
    pub config_file: String,
    /// Full parsed document.
    pub config: Document,
    /// Copies of the highlighted sections, flattened into the top level.
    #[serde(flatten)]
    pub highlights: Map<String, Value>,
}

impl NotificationPayload {
    /// Build the payload for an update of `section`.
    ///
    /// Highlight keys missing from the document, or clashing with the
    /// fixed payload fields, are skipped.
    pub fn config_update(
        section: &str,
        source: &str,
        config_file: String,
        config: Document,
        highlight_keys: &[String],
    ) -> Self {
        const FIXED_FIELDS: &[&str] = &[
            "timestamp",
            "section",
            "action",
            "source",
            "configFile",
            "config",
        ];

        let highlights = highlight_keys
            .iter()
            .filter(|key| !FIXED_FIELDS.contains(&key.as_str()))
            .filter_map(|key| config.get(key).map(|value| (key.clone(), value.clone())))
            .collect();

        Self {
            timestamp: Utc::now(),
            section: section.to_string(),
            action: ACTION_CONFIG_UPDATE.to_string(),
            source: source.to_string(),
            config_file,
            config,
            highlights,
        }
    }
}
