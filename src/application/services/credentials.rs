//! Credential file persistence
//!
//! The only component that reads or writes the credential file. Reads never
//! fail: a missing or corrupt file is an empty document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{CredentialDocument, SessionRecord};
use crate::infrastructure::traits::FileSystem;

/// Read-merge-write store for per-endpoint session records.
pub struct CredentialStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record for `endpoint`, or None if the file, document or entry is missing.
    pub fn read(&self, endpoint: &str) -> Option<SessionRecord> {
        self.load_document()?.credentials.get(endpoint).cloned()
    }

    /// Store `record` under `endpoint`, keeping every other entry.
    pub fn write(&self, endpoint: &str, record: &SessionRecord) -> ApplicationResult<()> {
        debug!("write: endpoint={} path={}", endpoint, self.path.display());
        let mut document = self.load_document().unwrap_or_default();
        document
            .credentials
            .insert(endpoint.to_string(), record.clone());
        self.save_document(&document)
    }

    /// Remove the record for `endpoint`. Absent entries and files are not an error.
    pub fn delete(&self, endpoint: &str) -> ApplicationResult<()> {
        let Some(mut document) = self.load_document() else {
            debug!("delete: nothing stored at {}", self.path.display());
            return Ok(());
        };
        if document.credentials.remove(endpoint).is_none() {
            debug!("delete: no record for {}", endpoint);
            return Ok(());
        }
        self.save_document(&document)
    }

    fn load_document(&self) -> Option<CredentialDocument> {
        if !self.fs.exists(&self.path) {
            return None;
        }
        let content = match self.fs.read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!("cannot read {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("ignoring unparseable {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    fn save_document(&self, document: &CredentialDocument) -> ApplicationResult<()> {
        let content = serde_json::to_string_pretty(document).map_err(|e| {
            ApplicationError::OperationFailed {
                context: format!("serialize credentials: {}", self.path.display()),
                source: Box::new(e),
            }
        })?;

        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create credentials directory", &self.path)?;

        let tmp = self.path.with_extension("json.tmp");
        self.fs
            .write_private(&tmp, &content)
            .with_path_context("write credentials", &tmp)?;
        self.fs
            .rename(&tmp, &self.path)
            .with_path_context("replace credentials", &self.path)
    }
}
