//! In-memory RSVP records for the open-house sign-in page.
//!
//! Records are keyed by email; submitting the same email again updates
//! the existing record instead of creating a new one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RsvpError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Invalid email address")]
    InvalidEmail,
}

/// Submission from the sign-in form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub guests: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub guests: u32,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Process-wide RSVP store. Cheap to clone.
#[derive(Clone, Default)]
pub struct RsvpStore {
    records: Arc<RwLock<Vec<Rsvp>>>,
}

impl RsvpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update the record for the input's email.
    ///
    /// Returns the stored record and whether it was newly created.
    pub fn upsert(&self, input: RsvpInput) -> Result<(Rsvp, bool), RsvpError> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(RsvpError::MissingField { field: "name" });
        }
        if email.is_empty() {
            return Err(RsvpError::MissingField { field: "email" });
        }
        if !is_plausible_email(&email) {
            return Err(RsvpError::InvalidEmail);
        }

        let phone = non_empty(input.phone);
        let message = non_empty(input.message);
        let guests = input.guests.unwrap_or(1).max(1);
        let now = Utc::now();

        let mut records = self.records.write();
        if let Some(existing) = records.iter_mut().find(|r| r.email == email) {
            existing.name = name;
            existing.phone = phone;
            existing.guests = guests;
            existing.message = message;
            existing.updated_at = now;
            return Ok((existing.clone(), false));
        }

        let record = Rsvp {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            guests,
            message,
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());
        Ok((record, true))
    }

    /// All records in creation order.
    pub fn list(&self) -> Vec<Rsvp> {
        self.records.read().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Rsvp> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
