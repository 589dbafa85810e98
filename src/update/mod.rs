//! Applies partial content updates to the site configuration module.
//!
//! One update is: load the module, deep-merge the partial config, back up
//! the old file, render and write the new one, then queue a notification.
//! Updates are serialized behind a process-wide lock.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::notify::NotificationDispatcher;
use crate::site::{merge_document, render_module, Document, ModuleStore, RenderError, StoreError};

/// Errors surfaced to callers of [`UpdateService::apply_update`].
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Missing section label or empty config; nothing was touched.
    #[error("{0}")]
    InvalidRequest(String),

    /// Render or write failed; the backup was restored when possible.
    #[error("Failed to update configuration")]
    UpdateFailed {
        #[source]
        source: PersistError,
    },
}

/// Internal cause of an [`UpdateError::UpdateFailed`].
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct UpdateService {
    inner: Arc<UpdateInner>,
}

struct UpdateInner {
    store: ModuleStore,
    notifier: NotificationDispatcher,
    write_lock: Mutex<()>,
}

impl UpdateService {
    pub fn new(store: ModuleStore, notifier: NotificationDispatcher) -> Self {
        Self {
            inner: Arc::new(UpdateInner {
                store,
                notifier,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn store(&self) -> &ModuleStore {
        &self.inner.store
    }

    /// The document as currently on disk (empty if missing or unparsable).
    pub async fn current_document(&self) -> Document {
        self.inner.store.load().await
    }

    /// Merge `partial` into the module and persist it.
    ///
    /// `section` is a human label used for logging, the notification and
    /// the confirmation message; the keys of `partial` select the exports.
    pub async fn apply_update(&self, section: &str, partial: Document) -> Result<String, UpdateError> {
        let section = section.trim();
        if section.is_empty() {
            return Err(UpdateError::InvalidRequest("Section is required".to_string()));
        }
        if partial.is_empty() {
            return Err(UpdateError::InvalidRequest("Config is required".to_string()));
        }

        let _guard = self.inner.write_lock.lock().await;
        let store = &self.inner.store;

        let mut document = store.load().await;
        let updated_keys: Vec<String> = partial.keys().cloned().collect();
        merge_document(&mut document, partial);

        // Only a backup taken by this call may be restored over the module.
        let snapshotted = match store.snapshot().await {
            Ok(true) => {
                tracing::debug!(backup = %store.backup_path().display(), "Backup written");
                true
            }
            Ok(false) => {
                tracing::debug!("No existing module to back up");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backup failed, continuing without snapshot");
                false
            }
        };

        let text = match self.persist(&document).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(section, error = %e, "Config update failed");
                if snapshotted {
                    self.restore_after_failure().await;
                } else {
                    tracing::warn!("No backup from this update, module left as it was");
                }
                return Err(UpdateError::UpdateFailed { source: e });
            }
        };

        tracing::info!(
            section,
            keys = ?updated_keys,
            path = %store.path().display(),
            "Site configuration updated"
        );

        self.inner.notifier.notify_update(section, text, document);

        Ok(format!("{} configuration updated successfully", section))
    }

    async fn persist(&self, document: &Document) -> Result<String, PersistError> {
        let text = render_module(document, Utc::now())?;
        self.inner.store.write(&text).await?;
        Ok(text)
    }

    async fn restore_after_failure(&self) {
        match self.inner.store.restore().await {
            Ok(true) => tracing::info!("Restored site configuration from backup"),
            Ok(false) => tracing::warn!("No backup available to restore"),
            Err(e) => tracing::error!(error = %e, "Failed to restore site configuration from backup"),
        }
    }
}
