//! Persistent store accessor over a key/value local storage.
//!
//! The document lives under [`DOCUMENT_KEY`] and the backup ring under
//! [`BACKUP_KEY`]. Every save replaces the whole document.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use tracing::{error, info, warn};

use crate::backup::{BackupRecord, BackupRing};
use crate::error::Result;
use crate::models::Document;

/// Storage key of the application document.
pub const DOCUMENT_KEY: &str = "school_supervisor_document";

/// Storage key of the backup ring.
pub const BACKUP_KEY: &str = "school_supervisor_backups";

/// String key/value storage, the equivalent of browser local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Reads and writes the document and its backup ring.
pub struct DocumentStore<S: Storage> {
    storage: S,
    unreadable: bool,
}

impl<S: Storage> DocumentStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            unreadable: false,
        }
    }

    /// Whether the last [`load`](Self::load) found a document it could not parse.
    pub fn found_unreadable(&self) -> bool {
        self.unreadable
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Load the last saved document, defaulting any missing top-level key.
    ///
    /// A document that no longer parses is archived into the backup ring and
    /// replaced by the default document in memory; it is not overwritten on
    /// disk until the next save. The same unreadable text is archived once,
    /// however often it is loaded.
    pub fn load(&mut self) -> Result<Document> {
        self.unreadable = false;
        let Some(raw) = self.storage.get(DOCUMENT_KEY)? else {
            info!("No saved document, starting with defaults");
            return Ok(Document::default());
        };

        match serde_json::from_str::<Document>(&raw) {
            Ok(doc) => {
                info!("Loaded document ({} bytes)", raw.len());
                Ok(doc)
            }
            Err(e) => {
                self.unreadable = true;
                if self.backups()?.records().iter().any(|r| r.data == raw) {
                    warn!("Saved document is unreadable ({e}), already archived, starting with defaults");
                } else {
                    warn!("Saved document is unreadable ({e}), archiving it and starting with defaults");
                    self.push_backup(BackupRecord::from_raw(raw, "unreadable document"))?;
                }
                Ok(Document::default())
            }
        }
    }

    /// Serialize and write the complete document.
    pub fn save(&mut self, doc: &Document) -> Result<()> {
        let text = serde_json::to_string(doc)?;
        self.storage.set(DOCUMENT_KEY, &text).inspect_err(|e| {
            error!("Failed to save document: {e}");
        })
    }

    /// Current backup ring. An unreadable ring is treated as empty.
    pub fn backups(&self) -> Result<BackupRing> {
        let Some(raw) = self.storage.get(BACKUP_KEY)? else {
            return Ok(BackupRing::default());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Backup ring is unreadable ({e}), starting a new one");
            BackupRing::default()
        }))
    }

    /// Write the backup ring.
    pub fn save_backups(&mut self, ring: &BackupRing) -> Result<()> {
        let text = serde_json::to_string(ring)?;
        self.storage.set(BACKUP_KEY, &text).inspect_err(|e| {
            error!("Failed to save backups: {e}");
        })
    }

    /// Copy `current` into the backup ring under a timestamped label.
    pub fn archive_snapshot(&mut self, current: &Document, reason: &str) -> Result<BackupRecord> {
        let record = BackupRecord::snapshot(current, reason)?;
        self.push_backup(record.clone())?;
        info!("Archived snapshot '{}'", record.label);
        Ok(record)
    }

    fn push_backup(&mut self, record: BackupRecord) -> Result<()> {
        let mut ring = self.backups()?;
        ring.push(record);
        self.save_backups(&ring)
    }
}
