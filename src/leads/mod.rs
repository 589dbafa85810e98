//! Lead-capture relay: validate a landing-page submission and forward it
//! to the CRM webhook.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::notify::{ForwardError, WebhookForwarder};
use crate::settings::LeadSettings;

const DEFAULT_SOURCE: &str = "landing-page";

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Lead webhook is not configured")]
    NotConfigured,

    #[error("Failed to forward lead: {0}")]
    Forward(#[from] ForwardError),
}

/// Validated lead, as relayed to the webhook.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub submitted_at: DateTime<Utc>,
    /// Every other field of the submission, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Lead {
    /// Validate a raw submission.
    ///
    /// A name is either `name` or `firstName` + `lastName`; `email` and
    /// `phone` are always required.
    pub fn from_submission(mut fields: Map<String, Value>) -> Result<Self, LeadError> {
        let name = take_text(&mut fields, "name").or_else(|| {
            let first = text(&fields, "firstName");
            let last = text(&fields, "lastName");
            match (first, last) {
                (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
                _ => None,
            }
        });
        let email = take_text(&mut fields, "email");
        let phone = take_text(&mut fields, "phone");

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name");
        }
        if email.is_none() {
            missing.push("email");
        }
        if phone.is_none() {
            missing.push("phone");
        }

        let (Some(name), Some(email), Some(phone)) = (name, email, phone) else {
            return Err(LeadError::MissingFields(missing));
        };

        let source = take_text(&mut fields, "source").unwrap_or_else(|| DEFAULT_SOURCE.to_string());
        fields.remove("submittedAt");

        Ok(Self {
            name,
            email,
            phone,
            source,
            submitted_at: Utc::now(),
            extra: fields,
        })
    }
}

/// Forwards leads to the configured webhook.
#[derive(Clone)]
pub struct LeadForwarder {
    target: Option<(WebhookForwarder, String)>,
}

impl LeadForwarder {
    pub fn new(settings: &LeadSettings) -> Result<Self, ForwardError> {
        let target = match &settings.webhook_url {
            Some(url) => Some((WebhookForwarder::new(settings.timeout())?, url.clone())),
            None => None,
        };
        Ok(Self { target })
    }

    /// Validate and relay a submission.
    pub async fn submit(&self, fields: Map<String, Value>) -> Result<Lead, LeadError> {
        let lead = Lead::from_submission(fields)?;
        let Some((forwarder, url)) = &self.target else {
            tracing::error!("Lead received but no lead webhook is configured");
            return Err(LeadError::NotConfigured);
        };

        forwarder.post_json(url, &lead).await?;
        tracing::info!(source = %lead.source, "Lead forwarded");
        Ok(lead)
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Remove `key` from the submission, keeping it only when it is usable text.
fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    let value = text(fields, key);
    fields.remove(key);
    value
}
