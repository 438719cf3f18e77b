//! Tests for the status store.

use super::*;
use crate::error::ClaimError;
use std::fs;
use tempfile::TempDir;

fn record(item: &str, task: &str, message: &str) -> StatusRecord {
    StatusRecord::new("node1", 100, item, task, message)
}

#[test]
fn test_path_for_follows_naming_convention() {
    let store = StatusStore::new("/shared/queue");
    assert_eq!(
        store.path_for("report", "ocr"),
        std::path::Path::new("/shared/queue/report.ocr.status")
    );
}

#[test]
fn test_create_then_exists_and_read() {
    let temp_dir = TempDir::new().unwrap();
    let store = StatusStore::new(temp_dir.path());

    assert!(!store.exists("report", "ocr").unwrap());
    assert!(store.read("report", "ocr").unwrap().is_none());

    let rec = record("report", "ocr", "queued");
    assert!(store.create(&rec).unwrap());

    assert!(store.exists("report", "ocr").unwrap());
    assert_eq!(store.read("report", "ocr").unwrap(), Some(rec));
}

#[test]
fn test_create_does_not_replace_existing() {
    let temp_dir = TempDir::new().unwrap();
    let store = StatusStore::new(temp_dir.path());

    let first = record("report", "ocr", "first");
    assert!(store.create(&first).unwrap());
    assert!(!store.create(&record("report", "ocr", "second")).unwrap());

    assert_eq!(store.read("report", "ocr").unwrap(), Some(first));
}

#[test]
fn test_overwrite_replaces_content() {
    let temp_dir = TempDir::new().unwrap();
    let store = StatusStore::new(temp_dir.path());

    store.create(&record("report", "ocr", "a long first message")).unwrap();
    let second = record("report", "ocr", "done");
    store.overwrite(&second).unwrap();

    let content = fs::read_to_string(store.path_for("report", "ocr")).unwrap();
    assert_eq!(content, second.encode());
    assert!(!content.contains("first"));
}

#[test]
fn test_read_malformed_record_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let store = StatusStore::new(temp_dir.path());
    fs::write(store.path_for("report", "ocr"), "").unwrap();

    let err = store.read("report", "ocr").unwrap_err();
    assert!(matches!(err, ClaimError::MalformedRecord(_)));
    assert!(err.to_string().contains("report.ocr.status"));
    assert!(store.exists("report", "ocr").unwrap());
}

#[test]
fn test_list_sorts_and_skips_foreign_files() {
    let temp_dir = TempDir::new().unwrap();
    let store = StatusStore::new(temp_dir.path());

    store.create(&record("b", "ocr", "x")).unwrap();
    store.create(&record("a", "thumb", "y")).unwrap();
    store.create(&record("a", "ocr", "z")).unwrap();
    fs::write(temp_dir.path().join("lockfile"), "{}").unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();
    fs::write(temp_dir.path().join(".a.ocr.status.node1.1.0.tmp"), "partial").unwrap();

    let listed: Vec<(String, String)> = store
        .list()
        .unwrap()
        .into_iter()
        .map(|e| (e.item, e.task))
        .collect();

    assert_eq!(
        listed,
        vec![
            ("a".to_string(), "ocr".to_string()),
            ("a".to_string(), "thumb".to_string()),
            ("b".to_string(), "ocr".to_string()),
        ]
    );
}

#[test]
fn test_list_surfaces_malformed_markers() {
    let temp_dir = TempDir::new().unwrap();
    let store = StatusStore::new(temp_dir.path());

    fs::write(store.path_for("broken", "ocr"), "not a record\n").unwrap();
    store.create(&record("fine", "ocr", "ok")).unwrap();

    let entries = store.list().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].record.is_err());
    assert_eq!(entries[0].item, "broken");
    assert_eq!(entries[1].record.as_ref().unwrap().message, "ok");
}

#[test]
fn test_list_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let store = StatusStore::new(temp_dir.path().join("missing"));
    assert!(store.list().is_err());
}

#[test]
fn test_validate_identifier() {
    for ok in ["report", "archive.tar", "run-1_a", "ünïcode"] {
        assert!(validate_identifier("item", ok).is_ok(), "{:?} should be valid", ok);
    }

    for bad in ["", ".", "..", "a/b", "a\\b", "a|b", "a\nb", "a\rb", "a\0b"] {
        let err = validate_identifier("task", bad).unwrap_err();
        assert!(matches!(err, ClaimError::InvalidIdentifier(_)));
        assert!(err.to_string().contains("task identifier"));
    }
}

#[test]
fn test_validate_pair_rejects_dotted_task() {
    assert!(validate_pair("archive.tar", "unpack").is_ok());

    let err = validate_pair("a", "b.c").unwrap_err();
    assert!(matches!(err, ClaimError::InvalidIdentifier(_)));
    assert!(err.to_string().contains("must not contain '.'"));

    assert!(validate_pair("", "ocr").is_err());
    assert!(validate_pair("report", "a|b").is_err());
}

#[test]
fn test_item_dots_round_trip_through_list() {
    let temp_dir = TempDir::new().unwrap();
    let store = StatusStore::new(temp_dir.path());

    store.create(&record("a.b", "c", "dotted item")).unwrap();

    let entries = store.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].item, "a.b");
    assert_eq!(entries[0].task, "c");
}
