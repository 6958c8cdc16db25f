//! Import, merge and restore behaviour.

use chrono::NaiveDate;
use serde_json::json;

use super::*;
use crate::backup::MAX_BACKUPS;
use crate::models::{AbsenceLog, Violation};
use crate::store::MemoryStorage;

fn log(id: &str, name: &str) -> AbsenceLog {
    AbsenceLog {
        id: id.to_string(),
        student_name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
        ..Default::default()
    }
}

fn violation(id: &str) -> Violation {
    Violation {
        id: id.to_string(),
        name: format!("Student {id}"),
        category: "behavior".into(),
        ..Default::default()
    }
}

fn base_document() -> Document {
    let mut doc = Document::default();
    doc.profile.school_name = "Al Noor".into();
    doc.absence_logs = vec![log("a1", "Omar"), log("a2", "Lina")];
    doc.violations = vec![violation("v1")];
    doc.custom_violations.insert("devices".into(), vec!["Smart watch".into()]);
    doc
}

fn store_with(doc: &Document) -> DocumentStore<MemoryStorage> {
    let mut store = DocumentStore::new(MemoryStorage::default());
    store.save(doc).unwrap();
    store
}

#[test]
fn test_merge_is_idempotent_on_id() {
    let current = base_document();
    let mut incoming = Document::default();
    incoming.absence_logs = vec![log("a2", "Lina"), log("b1", "Yousef")];
    incoming.violations = vec![violation("v1"), violation("v2")];

    let once = merge(&current, &incoming);
    let twice = merge(&once, &incoming);
    assert_eq!(once, twice);
    assert_eq!(once.absence_logs.len(), 3);
    assert_eq!(once.violations.len(), 2);
}

#[test]
fn test_merge_never_drops_existing_records() {
    let current = base_document();
    let mut incoming = Document::default();
    incoming.absence_logs = vec![log("a1", "Changed name")];

    let merged = merge(&current, &incoming);
    for kind in EntityKind::ALL {
        assert!(merged.count(kind) >= current.count(kind), "{kind} shrank");
    }
    // Current wins on id collision
    assert_eq!(merged.absence_logs[0].student_name, "Omar");
}

#[test]
fn test_merge_keeps_profile_and_unknown_keys_from_current() {
    let mut current = base_document();
    current.extra.insert("legacyFlag".into(), json!(true));
    let mut incoming = Document::default();
    incoming.profile.school_name = "Other School".into();
    incoming.extra.insert("legacyFlag".into(), json!(false));

    let merged = merge(&current, &incoming);
    assert_eq!(merged.profile.school_name, "Al Noor");
    assert_eq!(merged.extra.get("legacyFlag"), Some(&json!(true)));
}

#[test]
fn test_merge_unions_custom_violation_categories() {
    let current = base_document();
    let mut incoming = Document::default();
    incoming
        .custom_violations
        .insert("devices".into(), vec!["Headphones".into(), "Smart watch".into()]);
    incoming.custom_violations.insert("other".into(), vec!["Cheating".into()]);

    let merged = merge(&current, &incoming);
    assert_eq!(merged.custom_violations["devices"], vec!["Smart watch", "Headphones"]);
    assert_eq!(merged.custom_violations["other"], vec!["Cheating"]);
}

#[test]
fn test_idless_records_fall_back_to_content() {
    let mut current = Document::default();
    current.absence_logs = vec![log("", "Omar")];
    let mut incoming = Document::default();
    incoming.absence_logs = vec![log("", "Omar"), log("", "Lina")];

    let merged = merge(&current, &incoming);
    let names: Vec<_> = merged.absence_logs.iter().map(|l| l.student_name.as_str()).collect();
    assert_eq!(names, vec!["Omar", "Lina"]);
}

#[test]
fn test_merge_counts_report_added_records() {
    let current = base_document();
    let mut incoming = Document::default();
    incoming.absence_logs = vec![log("a1", "Omar"), log("b2", "Huda")];
    let (_, counts) = merge_counted(&current, &incoming);
    assert_eq!(counts[&EntityKind::AbsenceLogs], 1);
    assert_eq!(counts[&EntityKind::Violations], 0);
}

#[test]
fn test_merge_import_scenario() {
    let mut current = Document::default();
    current.absence_logs = vec![log("a1", "Omar")];
    let mut store = store_with(&current);

    let file = json!({
        "absenceLogs": [
            serde_json::to_value(log("a1", "Omar")).unwrap(),
            serde_json::to_value(log("b2", "Huda")).unwrap(),
        ]
    });
    let bytes = serde_json::to_vec(&file).unwrap();

    let outcome = import(&mut store, &current, &bytes, ImportMode::Merge).unwrap();
    let ids: Vec<_> = outcome.document.absence_logs.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "b2"]);
    assert_eq!(outcome.total_added(), 1);

    let ring = store.backups().unwrap();
    assert_eq!(ring.len(), 1);
    assert_eq!(ring.records()[0].document().unwrap(), current);
    assert_eq!(store.load().unwrap(), outcome.document);
}

#[test]
fn test_overwrite_then_restore_reproduces_document() {
    let mut current = base_document();
    current.extra.insert("futureKey".into(), json!({"x": [1, 2]}));
    let mut store = store_with(&current);

    let bytes = br#"{"violations":[{"id":"zz","name":"New","date":"2025-01-02"}]}"#;
    let outcome = import(&mut store, &current, bytes, ImportMode::Overwrite).unwrap();
    assert_eq!(outcome.document.violations.len(), 1);
    assert!(outcome.document.absence_logs.is_empty());
    assert_eq!(outcome.added[&EntityKind::Violations], 1);

    let restored = restore_backup(&mut store, &outcome.document, &outcome.backup.id).unwrap();
    assert_eq!(restored, current);
    assert_eq!(store.load().unwrap(), current);
}

#[test]
fn test_overwrite_preserves_backup_ring() {
    let current = base_document();
    let mut store = store_with(&current);
    store.archive_snapshot(&current, "manual").unwrap();

    import(&mut store, &current, b"{}", ImportMode::Overwrite).unwrap();
    assert_eq!(store.backups().unwrap().len(), 2);
}

#[test]
fn test_backup_ring_capped_across_imports() {
    let current = base_document();
    let mut store = store_with(&current);
    for _ in 0..(MAX_BACKUPS + 3) {
        import(&mut store, &current, b"{}", ImportMode::Merge).unwrap();
    }
    assert_eq!(store.backups().unwrap().len(), MAX_BACKUPS);
}

#[test]
fn test_parse_rejects_invalid_json_and_non_objects() {
    assert!(matches!(parse_import_file(b"{oops"), Err(AppError::Parse(_))));
    assert!(matches!(parse_import_file(b"[1,2,3]"), Err(AppError::Parse(_))));
    assert!(matches!(parse_import_file(b"\"text\""), Err(AppError::Parse(_))));
}

#[test]
fn test_parse_rejects_wrong_shape() {
    let bytes = br#"{"absenceLogs": "not a list"}"#;
    assert!(matches!(parse_import_file(bytes), Err(AppError::Validation(_))));
}

#[test]
fn test_parse_accepts_bom_and_partial_documents() {
    let bytes = b"\xEF\xBB\xBF{\"profile\":{\"schoolName\":\"X\"}}";
    let doc = parse_import_file(bytes).unwrap();
    assert_eq!(doc.profile.school_name, "X");
}

#[test]
fn test_failed_parse_leaves_state_untouched() {
    let current = base_document();
    let mut store = store_with(&current);
    assert!(import(&mut store, &current, b"not json", ImportMode::Overwrite).is_err());
    assert!(store.backups().unwrap().is_empty());
    assert_eq!(store.load().unwrap(), current);
}

#[test]
fn test_failed_archive_aborts_import() {
    let mut store = DocumentStore::new(MemoryStorage::failing());
    let current = base_document();
    let result = import(&mut store, &current, b"{}", ImportMode::Overwrite);
    assert!(matches!(result, Err(AppError::Storage(_))));
}

#[test]
fn test_restore_unknown_backup_is_not_found() {
    let current = base_document();
    let mut store = store_with(&current);
    assert!(matches!(
        restore_backup(&mut store, &current, "missing"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_delete_backup() {
    let current = base_document();
    let mut store = store_with(&current);
    let rec = store.archive_snapshot(&current, "manual").unwrap();
    delete_backup(&mut store, &rec.id).unwrap();
    assert!(list_backups(&store).unwrap().is_empty());
    assert!(delete_backup(&mut store, &rec.id).is_err());
}
