//! Field-level array merge of an imported document into the current one.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::{Document, Entity, EntityKind, KindVisitor, dispatch};

/// Deduplication key of a record.
///
/// Records with an id are keyed by it. Records without one fall back to a
/// hash of their content minus the id, so two distinct id-less records with
/// identical fields coalesce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Id(String),
    Content(String),
}

pub fn record_key<T: Entity>(record: &T) -> RecordKey {
    if record.id().is_empty() {
        RecordKey::Content(content_hash(record))
    } else {
        RecordKey::Id(record.id().to_string())
    }
}

/// SHA-256 of the record's canonical JSON with the `id` field removed.
fn content_hash<T: Serialize>(record: &T) -> String {
    let mut value = serde_json::to_value(record).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    let digest = Sha256::digest(value.to_string().as_bytes());
    format!("{digest:x}")
}

/// Keep every current record, then append incoming records whose key was not
/// seen yet. Returns the merged list and how many records were appended.
pub fn merge_records<T: Entity>(current: &[T], incoming: &[T]) -> (Vec<T>, usize) {
    let mut seen: HashSet<RecordKey> = current.iter().map(record_key).collect();
    let mut merged = current.to_vec();
    let mut added = 0;
    for record in incoming {
        if seen.insert(record_key(record)) {
            merged.push(record.clone());
            added += 1;
        }
    }
    (merged, added)
}

/// Per-category set union; current entries keep their order.
pub fn merge_custom_violations(
    current: &BTreeMap<String, Vec<String>>,
    incoming: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, Vec<String>> {
    let mut merged = current.clone();
    for (category, types) in incoming {
        let entry = merged.entry(category.clone()).or_default();
        for t in types {
            if !entry.contains(t) {
                entry.push(t.clone());
            }
        }
    }
    merged
}

/// Records appended per array by a merge.
pub type MergeCounts = BTreeMap<EntityKind, usize>;

/// Merge `incoming` into `current`.
///
/// All id-keyed arrays are unioned, custom violation categories are
/// set-unioned, and the profile plus any unknown keys stay from `current`.
pub fn merge(current: &Document, incoming: &Document) -> Document {
    merge_counted(current, incoming).0
}

/// [`merge`], also reporting how many records each array gained.
pub fn merge_counted(current: &Document, incoming: &Document) -> (Document, MergeCounts) {
    struct MergeKind<'a> {
        target: &'a mut Document,
        incoming: &'a Document,
    }

    impl KindVisitor for MergeKind<'_> {
        type Output = usize;

        fn visit<T: Entity>(self) -> usize {
            let (merged, added) = merge_records(T::records(self.target), T::records(self.incoming));
            *T::records_mut(self.target) = merged;
            added
        }
    }

    let mut next = current.clone();
    let mut counts = MergeCounts::new();
    for kind in EntityKind::ALL {
        let added = dispatch(
            kind,
            MergeKind {
                target: &mut next,
                incoming,
            },
        );
        counts.insert(kind, added);
    }
    next.custom_violations = merge_custom_violations(&current.custom_violations, &incoming.custom_violations);
    (next, counts)
}
