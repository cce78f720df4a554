//! Configuration loading, layering and reload tests.

use assets_explorer::config::{deep_merge, layer, load_config, ConfigStore};
use filetime::FileTime;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn bump_mtime(path: &Path) {
    let later = SystemTime::now() + Duration::from_secs(10);
    filetime::set_file_mtime(path, FileTime::from_system_time(later)).unwrap();
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn test_partial_override_merges() {
    let defaults = json!({"paths": {"a": "1", "b": "2"}});
    let custom = json!({"partial": true, "paths": {"b": "99"}});

    assert_eq!(layer(defaults, custom), json!({"paths": {"a": "1", "b": "99"}}));
}

#[test]
fn test_full_override_replaces() {
    let defaults = json!({"paths": {"a": "1", "b": "2"}});
    let custom = json!({"paths": {"b": "99"}});

    assert_eq!(layer(defaults, custom), json!({"paths": {"b": "99"}}));
}

#[test]
fn test_partial_false_replaces() {
    let defaults = json!({"paths": {"a": "1"}, "ui": {}});
    let custom = json!({"partial": false, "paths": {"b": "2"}});

    assert_eq!(layer(defaults, custom), json!({"paths": {"b": "2"}}));
}

#[test]
fn test_lists_are_replaced_wholesale() {
    let base = json!({"ui": {"related_filter_keywords": ["Sound", "Icon"]}});
    let overlay = json!({"ui": {"related_filter_keywords": ["Text"]}});

    assert_eq!(
        deep_merge(base, overlay),
        json!({"ui": {"related_filter_keywords": ["Text"]}})
    );
}

#[test]
fn test_scalar_overrides_object() {
    let base = json!({"paths": {"a": "1"}, "extract": {"filter_pattern": "x"}});
    let overlay = json!({"extract": null});

    assert_eq!(
        deep_merge(base, overlay),
        json!({"paths": {"a": "1"}, "extract": null})
    );
}

// =============================================================================
// Files on disk
// =============================================================================

#[test]
fn test_load_resolves_relative_paths() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("config.json");
    fs::write(
        &base,
        r#"{"paths": {"gen_dir": "out/gen", "tool": "/opt/RdaConsole.exe"}, "ui": {"related_filter_keywords": ["a/b"]}}"#,
    )
    .unwrap();

    let values = load_config(dir.path(), &base, None).unwrap();
    assert_eq!(
        values["paths"]["gen_dir"],
        json!(dir.path().join("out/gen").to_string_lossy())
    );
    assert_eq!(values["paths"]["tool"], json!("/opt/RdaConsole.exe"));
    // Only the paths section is treated as paths.
    assert_eq!(values["ui"]["related_filter_keywords"], json!(["a/b"]));
}

#[test]
fn test_custom_file_layers_on_base() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"paths": {"gen_dir": "gen", "unpacked_dir": "unpacked"}}"#,
    )
    .unwrap();
    let custom = dir.path().join("local.json");
    fs::write(&custom, r#"{"partial": true, "paths": {"gen_dir": "elsewhere"}}"#).unwrap();

    let store = ConfigStore::open(dir.path(), Some(custom)).unwrap();
    assert_eq!(store.get_path("gen_dir"), Some(dir.path().join("elsewhere")));
    assert_eq!(store.get_path("unpacked_dir"), Some(dir.path().join("unpacked")));
    assert!(store.get("partial").is_none());
}

#[test]
fn test_malformed_base_is_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), "{ \"paths\": ").unwrap();

    let err = ConfigStore::open(dir.path(), None).unwrap_err();
    assert!(err.to_string().contains("malformed JSON"));
    assert!(err.to_string().contains("config.json"));
}

#[test]
fn test_malformed_custom_is_fatal() {
    let dir = tempdir().unwrap();
    let custom = dir.path().join("custom.json");
    fs::write(&custom, "[]").unwrap();

    let err = ConfigStore::open(dir.path(), Some(custom)).unwrap_err();
    assert!(err.to_string().contains("must contain a JSON object"));
}

#[test]
fn test_missing_custom_is_fatal() {
    let dir = tempdir().unwrap();
    let err = ConfigStore::open(dir.path(), Some(dir.path().join("nope.json"))).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

// =============================================================================
// Reload
// =============================================================================

#[test]
fn test_reload_if_changed_picks_up_edits() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("config.json");
    fs::write(&base, r#"{"ui": {"related_filter_keywords": ["Sound"]}}"#).unwrap();

    let mut store = ConfigStore::open(dir.path(), None).unwrap();
    assert!(!store.reload_if_changed().unwrap());
    assert_eq!(store.blacklist_keywords().unwrap(), vec!["Sound".to_string()]);

    fs::write(&base, r#"{"ui": {"related_filter_keywords": ["Sound", "Icon"]}}"#).unwrap();
    bump_mtime(&base);

    assert_eq!(
        store.blacklist_keywords().unwrap(),
        vec!["Sound".to_string(), "Icon".to_string()]
    );
    assert!(!store.reload_if_changed().unwrap());
}

#[test]
fn test_failed_reload_keeps_previous_values() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("config.json");
    fs::write(&base, r#"{"paths": {"gen_dir": "gen"}}"#).unwrap();
    let mut store = ConfigStore::open(dir.path(), None).unwrap();

    fs::write(&base, "oops").unwrap();
    bump_mtime(&base);

    assert!(store.reload_if_changed().is_err());
    assert_eq!(store.get_path("gen_dir"), Some(dir.path().join("gen")));
}

#[test]
fn test_keyword_written_to_custom_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"paths": {}}"#).unwrap();
    let custom = dir.path().join("custom.json");
    fs::write(&custom, r#"{"partial": true}"#).unwrap();

    let mut store = ConfigStore::open(dir.path(), Some(custom.clone())).unwrap();
    assert!(store.add_blacklist_keyword("Sound").unwrap());
    assert!(!store.add_blacklist_keyword("Sound").unwrap());

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&custom).unwrap()).unwrap();
    assert_eq!(saved["ui"]["related_filter_keywords"], json!(["Sound"]));
    assert_eq!(saved["partial"], json!(true));
    assert_eq!(
        fs::read_to_string(dir.path().join("config.json")).unwrap(),
        r#"{"paths": {}}"#
    );
}
