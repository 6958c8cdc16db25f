//! Import engine: parse, archive, then overwrite or merge; plus backup restore.
//!
//! Every import archives the current document before committing. A parse or
//! validation failure leaves both the document and the backup ring untouched.

mod merge;

#[cfg(test)]
mod tests;

pub use merge::{MergeCounts, RecordKey, merge, merge_counted, merge_custom_violations, merge_records, record_key};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::backup::{BackupRecord, BackupRing};
use crate::error::{AppError, Result};
use crate::models::{Document, EntityKind};
use crate::store::{DocumentStore, Storage};

/// How an imported document is combined with the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Union arrays by record key.
    #[default]
    Merge,
    /// Replace the whole document.
    Overwrite,
}

impl ImportMode {
    pub fn label(self) -> &'static str {
        match self {
            ImportMode::Merge => "merge",
            ImportMode::Overwrite => "overwrite",
        }
    }
}

/// Result of a committed import.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub document: Document,
    /// Snapshot of the document as it was before the import.
    pub backup: BackupRecord,
    pub added: MergeCounts,
}

impl ImportOutcome {
    pub fn total_added(&self) -> usize {
        self.added.values().sum()
    }

    /// Human readable summary, e.g. "3 records added (violations: 2, absenceLogs: 1)".
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .added
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(kind, n)| format!("{kind}: {n}"))
            .collect();
        if parts.is_empty() {
            format!("{} records added", self.total_added())
        } else {
            format!("{} records added ({})", self.total_added(), parts.join(", "))
        }
    }
}

/// Parse an import file into a document.
///
/// The payload must be a JSON object; it is then checked against the
/// document shape so a well-formed but wrong-shaped file is rejected here
/// instead of corrupting state. Missing keys are allowed.
pub fn parse_import_file(bytes: &[u8]) -> Result<Document> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let value: Value = serde_json::from_slice(bytes).map_err(|e| AppError::parse(format!("not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(AppError::parse("expected a JSON object at the top level"));
    }
    serde_json::from_value(value).map_err(|e| AppError::validation(format!("file does not match the data model: {e}")))
}

/// Replace the whole document with `incoming`. The backup ring lives under
/// its own key and is not affected.
pub fn overwrite(incoming: Document) -> Document {
    incoming
}

/// Parse `bytes`, archive `current`, combine per `mode` and save.
pub fn import<S: Storage>(
    store: &mut DocumentStore<S>,
    current: &Document,
    bytes: &[u8],
    mode: ImportMode,
) -> Result<ImportOutcome> {
    let incoming = parse_import_file(bytes)?;
    let backup = store.archive_snapshot(current, &format!("Before import ({})", mode.label()))?;

    let (document, added) = match mode {
        ImportMode::Merge => merge_counted(current, &incoming),
        ImportMode::Overwrite => {
            let added = EntityKind::ALL.into_iter().map(|k| (k, incoming.count(k))).collect();
            (overwrite(incoming), added)
        }
    };

    store.save(&document)?;
    let outcome = ImportOutcome {
        document,
        backup,
        added,
    };
    info!("Import ({}) committed: {}", mode.label(), outcome.summary());
    Ok(outcome)
}

/// List snapshots, newest first.
pub fn list_backups<S: Storage>(store: &DocumentStore<S>) -> Result<BackupRing> {
    store.backups()
}

/// Archive `current`, then replace it with the snapshot `backup_id`.
pub fn restore_backup<S: Storage>(
    store: &mut DocumentStore<S>,
    current: &Document,
    backup_id: &str,
) -> Result<Document> {
    let ring = store.backups()?;
    let record = ring
        .find(backup_id)
        .ok_or_else(|| AppError::not_found(format!("backup {backup_id}")))?;
    let restored = record.document()?;

    store.archive_snapshot(current, "Before restore")?;
    store.save(&restored)?;
    info!("Restored backup '{}'", record.label);
    Ok(restored)
}

pub fn delete_backup<S: Storage>(store: &mut DocumentStore<S>, backup_id: &str) -> Result<()> {
    let mut ring = store.backups()?;
    if !ring.remove(backup_id) {
        return Err(AppError::not_found(format!("backup {backup_id}")));
    }
    store.save_backups(&ring)?;
    info!("Deleted backup {backup_id}");
    Ok(())
}
