use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;

use sprout_core::model::{ProgressDocument, SCHEMA_VERSION};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors surfaced by raw slot backends.
///
/// Callers above `ProgressStorage` never see these: the wrapper degrades
/// every failure to defaults (reads) or swallows it (writes).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── SLOT CONTRACT ─────────────────────────────────────────────────────────────
//

/// Raw single-slot persistence: one string value under one fixed key, the
/// shape of a browser local-storage entry.
///
/// `read` distinguishes "nothing stored" (`Ok(None)`) from a failing medium
/// so the wrapper can log the right thing; both degrade to the default
/// document.
pub trait ProgressStore: Send + Sync {
    /// Read the raw slot contents, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the medium cannot be read at all.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replace the raw slot contents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write is rejected (quota, permissions,
    /// disabled storage).
    fn write(&self, raw: &str) -> Result<(), StoreError>;
}

/// In-memory slot for tests and prototyping.
#[derive(Default)]
pub struct InMemoryStore {
    slot: Mutex<Option<String>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for InMemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        let guard = self
            .slot
            .lock()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(guard.clone())
    }

    fn write(&self, raw: &str) -> Result<(), StoreError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        *guard = Some(raw.to_owned());
        Ok(())
    }
}

//
// ─── DOCUMENT STORAGE ──────────────────────────────────────────────────────────
//

/// Document-level persistence over any raw slot.
///
/// This is the layer that realizes the app's failure semantics: loading
/// never fails (missing, unreadable, corrupt, or too-new data all degrade to
/// the default document), and saving is best-effort (a rejected write is
/// logged and swallowed, leaving the in-memory state authoritative for the
/// rest of the session).
#[derive(Clone)]
pub struct ProgressStorage {
    store: Arc<dyn ProgressStore>,
}

impl ProgressStorage {
    #[must_use]
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Storage backed by an in-memory slot.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// Load the progress document, substituting the default document for any
    /// failure. A successfully parsed document is normalized before use.
    #[must_use]
    pub fn load(&self, now: DateTime<Utc>) -> ProgressDocument {
        let raw = match self.store.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return ProgressDocument::new(now),
            Err(err) => {
                tracing::warn!(%err, "progress slot unreadable, starting fresh");
                return ProgressDocument::new(now);
            }
        };

        let mut doc: ProgressDocument = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(%err, "stored progress is not valid JSON, starting fresh");
                return ProgressDocument::new(now);
            }
        };

        if doc.schema_version > SCHEMA_VERSION {
            tracing::warn!(
                found = doc.schema_version,
                supported = SCHEMA_VERSION,
                "stored progress uses a newer schema, starting fresh"
            );
            return ProgressDocument::new(now);
        }

        doc.normalize();
        doc
    }

    /// Serialize and write the document. Failures are logged and swallowed;
    /// the caller's in-memory state stays authoritative either way.
    pub fn save(&self, doc: &ProgressDocument) {
        let raw = match serde_json::to_string(doc) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%err, "progress document failed to serialize");
                return;
            }
        };
        if let Err(err) = self.store.write(&raw) {
            tracing::warn!(%err, "failed to persist progress");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
