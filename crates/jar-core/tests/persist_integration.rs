//! Multi-store persistence tests
//!
//! Each `Store` here stands in for an independent process: nothing is shared
//! between them except the jar file on disk.

use cookiejar_core::io::atomic::TEMP_SUFFIX;
use cookiejar_core::io::document::load_document;
use cookiejar_core::io::{AtomicFile, Document, JarError, PersistOptions, SaveOutcome, Store};
use cookiejar_core::Cookie;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::time::Duration;
use tempfile::TempDir;

fn staging_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(TEMP_SUFFIX))
        .count()
}

fn stamp_after(path: &Path, pending: &AtomicFile) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(pending.created_at() + Duration::from_micros(1))
        .unwrap();
}

#[test]
fn test_cookie_jar_survives_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cookies.json");

    let jar: Store<Cookie> = Store::open(&path, PersistOptions::default()).unwrap();
    let mut cookie = Cookie::new("example.com", "sid", "abc123");
    cookie.secure = true;
    cookie
        .unknown_fields
        .insert("Partitioned".to_string(), serde_json::json!(true));
    jar.insert("example.com", "sid", cookie.clone());
    jar.insert("other.org", "pref", Cookie::new("other.org", "pref", "dark"));
    assert_eq!(jar.save().unwrap(), SaveOutcome::Clean);

    let reopened: Store<Cookie> = Store::open(&path, PersistOptions::default()).unwrap();
    assert_eq!(reopened.get("example.com", "sid"), Some(cookie));
    assert_eq!(reopened.snapshot(), jar.snapshot());
}

#[test]
fn test_losing_writer_merges_winner() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cookies.json");

    let a: Store<String> = Store::open(&path, PersistOptions::default()).unwrap();
    let b: Store<String> = Store::open(&path, PersistOptions::default()).unwrap();
    a.insert("dom1", "c1", "v1".to_string());
    a.insert("a-only", "k", "a".to_string());
    b.insert("dom1", "c1", "v2".to_string());
    b.insert("dom2", "c2", "v3".to_string());

    // A stages its write, then B lands first.
    let mut pending = AtomicFile::open(&path).unwrap();
    a.write_to(&mut pending).unwrap();
    b.save().unwrap();
    stamp_after(&path, &pending);

    let err = pending.commit().unwrap_err();
    assert!(err.is_conflict());
    let winner: Document<String> = load_document(&path).unwrap();
    assert_eq!(winner, b.snapshot());

    // What `save` does after a conflict: fold the winner in and go again.
    std::thread::sleep(Duration::from_millis(5));
    a.merge_from(winner);
    assert_eq!(a.save().unwrap(), SaveOutcome::Clean);

    let final_doc: Document<String> = load_document(&path).unwrap();
    assert_eq!(final_doc["dom1"]["c1"], "v2");
    assert_eq!(final_doc["dom2"]["c2"], "v3");
    assert_eq!(final_doc["a-only"]["k"], "a");
    assert_eq!(staging_files(temp_dir.path()), 0);
}

#[test]
fn test_independent_stores_hammering_one_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = Arc::new(temp_dir.path().join("cookies.json"));
    let writers = 4;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let path = Arc::clone(&path);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                for round in 0..10 {
                    let store: Store<String> =
                        Store::open(path.as_path(), PersistOptions::default()).unwrap();
                    store.insert(&format!("writer{w}"), &format!("r{round}"), "x".to_string());
                    store.save().unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Whatever interleaving happened, the file is whole and decodable.
    let final_doc: Document<String> = load_document(&path).unwrap();
    assert!(!final_doc.is_empty());
    assert_eq!(staging_files(temp_dir.path()), 0);
}

#[test]
fn test_fatal_errors_leave_no_staging_files() {
    let temp_dir = TempDir::new().unwrap();

    let unloaded: Store<String> = Store::new();
    assert!(matches!(unloaded.save(), Err(JarError::NotLoaded)));

    let missing_dir: Store<String> = Store::new();
    missing_dir.set_path(temp_dir.path().join("nope/cookies.json"));
    assert!(matches!(missing_dir.save(), Err(JarError::Io { .. })));

    assert_eq!(staging_files(temp_dir.path()), 0);
}

#[test]
fn test_save_then_interrupted_write_keeps_last_good_copy() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cookies.json");

    let store: Store<String> = Store::open(&path, PersistOptions::default()).unwrap();
    store.insert("a.com", "x", "1".to_string());
    store.save().unwrap();
    let good = fs::read(&path).unwrap();

    // A save that dies after staging but before commit.
    store.insert("a.com", "y", "2".to_string());
    let mut pending = AtomicFile::open(&path).unwrap();
    store.write_to(&mut pending).unwrap();
    drop(pending);

    assert_eq!(fs::read(&path).unwrap(), good);
    assert_eq!(staging_files(temp_dir.path()), 0);
}
