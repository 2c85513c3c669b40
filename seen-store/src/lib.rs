//! Flat-file persistence for the set of already-forwarded quotes.
//!
//! The file holds a JSON array of strings. Writes overwrite it in place and
//! are not atomic; a torn write surfaces as [`StoreError::Malformed`] on the
//! next load.

use quotebot_core::{CoreError, SeenSet, StoreError, DEFAULT_STORE_PATH};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;


#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl Default for SeenStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PATH)
    }
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the seen-set. A missing file is an empty set; duplicate entries collapse.
    pub async fn load(&self) -> Result<SeenSet, CoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No seen-set at {}, starting empty", self.path.display());
                return Ok(SeenSet::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source,
                }
                .into())
            }
        };

        let seen: SeenSet =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
                path: self.path.display().to_string(),
                source,
            })?;

        debug!(
            "Loaded {} seen quotes from {}",
            seen.len(),
            self.path.display()
        );
        Ok(seen)
    }

    /// Overwrites the file with the whole set.
    pub async fn save(&self, seen: &SeenSet) -> Result<(), CoreError> {
        let bytes = serde_json::to_vec(seen).map_err(|source| StoreError::Malformed {
            path: self.path.display().to_string(),
            source,
        })?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.display().to_string(),
                source,
            })?;

        debug!("Saved {} seen quotes to {}", seen.len(), self.path.display());
        Ok(())
    }
}
