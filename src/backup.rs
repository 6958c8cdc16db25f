//! Bounded ring of full-document snapshots for manual restore.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::ids::new_id;
use crate::models::Document;

/// Maximum number of snapshots kept; the oldest is evicted first.
pub const MAX_BACKUPS: usize = 5;

/// A timestamped snapshot of the serialized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: String,
    pub timestamp: DateTime<Local>,
    pub label: String,
    /// The document exactly as it was serialized at snapshot time.
    pub data: String,
}

impl BackupRecord {
    /// Snapshot `doc`, labelling it with `reason` and the current time.
    pub fn snapshot(doc: &Document, reason: &str) -> Result<Self> {
        Ok(Self::from_raw(serde_json::to_string(doc)?, reason))
    }

    /// Wrap already-serialized document text, valid or not.
    pub fn from_raw(data: String, reason: &str) -> Self {
        let timestamp = Local::now();
        Self {
            id: new_id(),
            label: format!("{reason} - {}", timestamp.format("%Y-%m-%d %H:%M:%S")),
            timestamp,
            data,
        }
    }

    /// Parse the snapshot back into a document.
    pub fn document(&self) -> Result<Document> {
        serde_json::from_str(&self.data)
            .map_err(|e| AppError::validation(format!("backup '{}' is not a valid document: {e}", self.label)))
    }

    /// Size of the snapshot in kilobytes, for display.
    pub fn size_kb(&self) -> f64 {
        self.data.len() as f64 / 1024.0
    }
}

/// Snapshots ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupRing {
    records: Vec<BackupRecord>,
}

impl BackupRing {
    /// Add a snapshot at the front, evicting the oldest beyond [`MAX_BACKUPS`].
    pub fn push(&mut self, record: BackupRecord) {
        self.records.insert(0, record);
        self.records.truncate(MAX_BACKUPS);
    }

    pub fn find(&self, id: &str) -> Option<&BackupRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Remove the snapshot with `id`. Returns false if it was not present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn records(&self) -> &[BackupRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str) -> BackupRecord {
        BackupRecord::from_raw("{}".to_string(), label)
    }

    #[test]
    fn test_ring_never_exceeds_capacity() {
        let mut ring = BackupRing::default();
        for i in 0..12 {
            ring.push(record(&format!("b{i}")));
            assert!(ring.len() <= MAX_BACKUPS);
        }
        assert_eq!(ring.len(), MAX_BACKUPS);
    }

    #[test]
    fn test_ring_evicts_oldest_first() {
        let mut ring = BackupRing::default();
        let ids: Vec<String> = (0..6)
            .map(|i| {
                let r = record(&format!("b{i}"));
                let id = r.id.clone();
                ring.push(r);
                id
            })
            .collect();

        // b0 was evicted, b5 is newest
        assert!(ring.find(&ids[0]).is_none());
        assert_eq!(ring.records()[0].id, ids[5]);
        assert_eq!(ring.records()[MAX_BACKUPS - 1].id, ids[1]);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut doc = Document::default();
        doc.profile.school_name = "Al Noor".into();
        let snap = BackupRecord::snapshot(&doc, "Before import").unwrap();
        assert!(snap.label.starts_with("Before import - "));
        assert_eq!(snap.document().unwrap(), doc);
    }

    #[test]
    fn test_remove() {
        let mut ring = BackupRing::default();
        let r = record("x");
        let id = r.id.clone();
        ring.push(r);
        assert!(ring.remove(&id));
        assert!(!ring.remove(&id));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_invalid_raw_snapshot_reports_error() {
        let r = BackupRecord::from_raw("not json".into(), "unreadable document");
        assert!(r.document().is_err());
    }
}
