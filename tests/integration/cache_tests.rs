//! Result cache persistence and external-modification tests.

use assets_explorer::cache::{AssetInfo, CacheRecord, CacheStats, ResultCache};
use filetime::FileTime;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn asset(guid: &str, name: &str) -> AssetInfo {
    AssetInfo {
        guid: guid.to_string(),
        name: name.to_string(),
        template: "Product".to_string(),
        file: "Product.xml".to_string(),
    }
}

/// Push the file's mtime into the future so the change is always visible,
/// even on filesystems with coarse timestamps.
fn bump_mtime(path: &Path) {
    let later = SystemTime::now() + Duration::from_secs(10);
    filetime::set_file_mtime(path, FileTime::from_system_time(later)).unwrap();
}

#[test]
fn test_absent_differs_from_not_found() {
    let dir = tempdir().unwrap();
    let mut cache = ResultCache::open(dir.path().join("cache.json"));

    assert_eq!(cache.get("100"), None);
    assert!(!cache.is_not_found("100"));

    cache.put_not_found("100").unwrap();
    assert_eq!(cache.get("100"), Some(CacheRecord::NotFound));
    assert!(cache.is_not_found("100"));
}

#[test]
fn test_records_survive_a_new_instance() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".cache").join("cache.json");

    {
        let mut cache = ResultCache::open(&path);
        cache.put_found("100", asset("100", "Wood")).unwrap();
        cache.put_not_found("404").unwrap();
    }

    let mut reopened = ResultCache::open(&path);
    assert_eq!(
        reopened.get("100"),
        Some(CacheRecord::Found(asset("100", "Wood")))
    );
    assert!(reopened.is_not_found("404"));
    assert_eq!(
        reopened.stats(),
        CacheStats {
            found: 1,
            not_found: 1,
            total: 2
        }
    );
}

#[test]
fn test_clear_not_found_keeps_found() {
    let dir = tempdir().unwrap();
    let mut cache = ResultCache::open(dir.path().join("cache.json"));
    cache.put_found("100", asset("100", "Wood")).unwrap();
    cache.put_not_found("1").unwrap();
    cache.put_not_found("2").unwrap();

    assert_eq!(cache.clear_not_found().unwrap(), 2);
    assert_eq!(cache.stats().total, 1);
    assert!(cache.get("100").is_some_and(|r| r.is_found()));

    // Nothing left to remove.
    assert_eq!(cache.clear_not_found().unwrap(), 0);
}

#[test]
fn test_clear_all() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let mut cache = ResultCache::open(&path);
    cache.put_found("100", asset("100", "Wood")).unwrap();
    cache.put_not_found("404").unwrap();

    cache.clear_all().unwrap();
    assert_eq!(cache.stats(), CacheStats::default());

    let on_disk: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, serde_json::json!({}));
}

#[test]
fn test_external_write_is_picked_up() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let mut cache = ResultCache::open(&path);
    cache.put_found("100", asset("100", "Wood")).unwrap();

    fs::write(
        &path,
        r#"{"200": {"status": "found", "guid": "200", "name": "Planks", "template": "Product", "file": "Product.xml"}}"#,
    )
    .unwrap();
    bump_mtime(&path);

    assert_eq!(cache.get("100"), None);
    assert_eq!(cache.get("200").and_then(CacheRecord::into_asset).map(|a| a.name), Some("Planks".to_string()));
}

#[test]
fn test_two_instances_share_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let mut writer = ResultCache::open(&path);
    let mut reader = ResultCache::open(&path);

    assert_eq!(reader.stats().total, 0);
    writer.put_not_found("404").unwrap();
    bump_mtime(&path);

    assert!(reader.is_not_found("404"));

    // Deleting the file empties every view of it.
    fs::remove_file(&path).unwrap();
    assert_eq!(reader.get("404"), None);
}

#[test]
fn test_extend_found_upgrades_not_found() {
    let dir = tempdir().unwrap();
    let mut cache = ResultCache::open(dir.path().join("cache.json"));
    cache.put_not_found("101").unwrap();
    cache.put_found("100", asset("100", "Wood")).unwrap();

    let added = cache
        .extend_found([asset("100", "Renamed"), asset("101", "Planks")])
        .unwrap();

    assert_eq!(added, 1);
    assert_eq!(cache.get("100").and_then(CacheRecord::into_asset).map(|a| a.name), Some("Wood".to_string()));
    assert!(cache.get("101").is_some_and(|r| r.is_found()));
}
