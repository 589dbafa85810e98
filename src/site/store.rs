//! On-disk storage for the site configuration module and its backup.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

use super::parse::parse_module;
use super::Document;

/// Errors from reading or writing the module files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy '{from}' to '{to}': {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The module file plus its `.backup` sibling.
#[derive(Debug, Clone)]
pub struct ModuleStore {
    path: PathBuf,
    backup_path: PathBuf,
    temp_path: PathBuf,
}

impl ModuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            backup_path: with_suffix(&path, ".backup"),
            temp_path: with_suffix(&path, ".tmp"),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Current module text, or `None` when the file does not exist yet.
    pub async fn read_text(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Load the current document.
    ///
    /// A missing, unreadable or unparsable module yields an empty document
    /// so the next update can recreate it.
    pub async fn load(&self) -> Document {
        let text = match self.read_text().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "Site config module not found, starting empty");
                return Document::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Site config module unreadable, starting empty");
                return Document::new();
            }
        };

        match parse_module(&text) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Site config module unparsable, starting empty"
                );
                Document::new()
            }
        }
    }

    /// Copy the current module to the backup path, replacing any older backup.
    ///
    /// Returns `false` when there is no module to back up; a backup left by
    /// an earlier module is removed in that case.
    pub async fn snapshot(&self) -> Result<bool, StoreError> {
        match fs::copy(&self.path, &self.backup_path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound && !self.path.exists() => {
                match fs::remove_file(&self.backup_path).await {
                    Ok(()) => Ok(false),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                    Err(e) => Err(StoreError::Write {
                        path: self.backup_path.clone(),
                        source: e,
                    }),
                }
            }
            Err(e) => Err(StoreError::Copy {
                from: self.path.clone(),
                to: self.backup_path.clone(),
                source: e,
            }),
        }
    }

    /// Replace the module with `text`.
    ///
    /// The text goes to a temporary sibling first and is renamed over the
    /// module, so readers see either the old or the new file in full.
    pub async fn write(&self, text: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Write {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let temp = scopeguard::guard(self.temp_path.clone(), |temp| {
            let _ = std::fs::remove_file(temp);
        });

        fs::write(&*temp, text).await.map_err(|e| StoreError::Write {
            path: self.temp_path.clone(),
            source: e,
        })?;

        fs::rename(&*temp, &self.path)
            .await
            .map_err(|e| StoreError::Write {
                path: self.path.clone(),
                source: e,
            })?;

        scopeguard::ScopeGuard::into_inner(temp);
        Ok(())
    }

    /// Copy the backup over the module.
    ///
    /// Returns `false` when no backup exists.
    pub async fn restore(&self) -> Result<bool, StoreError> {
        if !fs::try_exists(&self.backup_path).await.unwrap_or(false) {
            return Ok(false);
        }
        fs::copy(&self.backup_path, &self.path)
            .await
            .map_err(|e| StoreError::Copy {
                from: self.backup_path.clone(),
                to: self.path.clone(),
                source: e,
            })?;
        Ok(true)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
