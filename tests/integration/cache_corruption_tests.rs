//! Recovery from damaged cache files.

use assets_explorer::cache::{CacheRecord, ResultCache};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_garbage_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    fs::write(&path, b"not json at all {").unwrap();

    let mut cache = ResultCache::open(&path);
    assert_eq!(cache.get("100"), None);
    assert_eq!(cache.stats().total, 0);
}

#[test]
fn test_next_write_replaces_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    fs::write(&path, b"[1, 2, 3]").unwrap();

    let mut cache = ResultCache::open(&path);
    cache.put_not_found("404").unwrap();

    let on_disk: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["404"]["status"], "not_found");
    assert_eq!(on_disk.as_object().unwrap().len(), 1);
}

#[test]
fn test_truncated_file_recovers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    fs::write(&path, r#"{"100": {"status": "found", "guid": "10"#).unwrap();

    let mut cache = ResultCache::open(&path);
    assert!(cache.clear_not_found().is_ok());
    assert_eq!(fs::read_to_string(&path).unwrap().trim(), "{}");
}

#[test]
fn test_unreadable_entries_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    fs::write(
        &path,
        r#"{
            "100": {"status": "found", "guid": "100", "name": "Wood", "template": "Product", "file": "Product.xml"},
            "101": {"status": "exploded"},
            "102": 42
        }"#,
    )
    .unwrap();

    let mut cache = ResultCache::open(&path);
    assert!(cache.get("100").is_some_and(|r| r.is_found()));
    assert_eq!(cache.get("101"), None);
    assert_eq!(cache.get("102"), None);
    assert_eq!(cache.stats().total, 1);
}

#[test]
fn test_legacy_entries_are_understood() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    fs::write(
        &path,
        r#"{
            "100": {"guid": "100", "name": "Wood", "template": "Product", "file": "Product.xml"},
            "404": {"not_found": true}
        }"#,
    )
    .unwrap();

    let mut cache = ResultCache::open(&path);
    assert!(cache.get("100").is_some_and(|r| r.is_found()));
    assert_eq!(cache.get("404"), Some(CacheRecord::NotFound));
}

#[cfg(unix)]
#[test]
fn test_write_failure_keeps_memory_state() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    let path = locked.join("cache.json");

    let mut cache = ResultCache::open(&path);
    cache.put_not_found("1").unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    let result = cache.put_not_found("2");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    // Root ignores directory permissions.
    if result.is_err() {
        assert!(result.unwrap_err().to_string().contains("cache.json"));
        assert_eq!(cache.get("2"), None);
        assert_eq!(cache.stats().total, 1);
    }
}
