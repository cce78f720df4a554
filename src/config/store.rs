//! The reloading configuration store.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde_json::Value;

use super::defaults::{self, BLACKLIST_KEY, CACHE_FILE_KEY, CONFIG_FILE_NAME, DEFAULT_CACHE_FILE};
use super::merge::{self, dotted_keys, lookup, lookup_or_insert, PATHS_KEY};
use super::{ConfigError, ConfigResult};
use crate::fsio;

/// Minimum Jaro-Winkler similarity for a key to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Resolved configuration plus the file stamps it was built from.
///
/// Reads go through [`ConfigStore::reload_if_changed`] where freshness
/// matters, so edits made by another process (or by hand) are picked up on
/// the next access without restarting.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
    base_path: PathBuf,
    override_path: Option<PathBuf>,
    values: Value,
    base_stamp: Option<SystemTime>,
    override_stamp: Option<SystemTime>,
}

impl ConfigStore {
    /// Open `<root>/config.json`, optionally layered with a custom file.
    pub fn open(root: impl Into<PathBuf>, override_path: Option<PathBuf>) -> ConfigResult<Self> {
        let root = root.into();
        let base_path = root.join(CONFIG_FILE_NAME);
        Self::load(root, base_path, override_path)
    }

    /// Load from explicit base and custom paths.
    ///
    /// # Errors
    ///
    /// Fails on unreadable or malformed files, or a missing custom file.
    pub fn load(
        root: impl Into<PathBuf>,
        base_path: impl Into<PathBuf>,
        override_path: Option<PathBuf>,
    ) -> ConfigResult<Self> {
        let mut store = Self {
            root: root.into(),
            base_path: base_path.into(),
            override_path,
            values: Value::Null,
            base_stamp: None,
            override_stamp: None,
        };
        store.reload()?;
        Ok(store)
    }

    /// Unconditionally re-read the configuration files.
    pub fn reload(&mut self) -> ConfigResult<()> {
        let base_stamp = fsio::modified(&self.base_path);
        let override_stamp = self.override_path.as_deref().and_then(fsio::modified);

        self.values = load_config(&self.root, &self.base_path, self.override_path.as_deref())?;
        self.base_stamp = base_stamp;
        self.override_stamp = override_stamp;

        log::debug!("Configuration loaded from {}", self.base_path.display());
        Ok(())
    }

    /// Re-read the configuration if a backing file changed since the last load.
    ///
    /// Costs one stat per active file when nothing changed. Returns whether a
    /// reload happened. On error the previous values are kept.
    pub fn reload_if_changed(&mut self) -> ConfigResult<bool> {
        let base_changed = fsio::is_newer(fsio::modified(&self.base_path), self.base_stamp);
        let override_changed = match &self.override_path {
            Some(path) => fsio::is_newer(fsio::modified(path), self.override_stamp),
            None => false,
        };

        if !base_changed && !override_changed {
            return Ok(false);
        }

        log::debug!("Configuration changed on disk, reloading");
        self.reload()?;
        Ok(true)
    }

    /// The resolved configuration document.
    #[must_use]
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Project root that relative paths are anchored at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the base configuration file.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the custom configuration file, if one is layered on top.
    #[must_use]
    pub fn override_path(&self) -> Option<&Path> {
        self.override_path.as_deref()
    }

    /// Whether the base file exists (as opposed to running on built-in defaults).
    #[must_use]
    pub fn has_base_file(&self) -> bool {
        self.base_stamp.is_some()
    }

    /// Value at a dotted key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.values, key)
    }

    /// String value at a dotted key; non-string scalars are rendered.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Boolean value at a dotted key; missing or non-boolean reads as `false`.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Entry of the `paths` section as a path. Already absolute after load.
    #[must_use]
    pub fn get_path(&self, name: &str) -> Option<PathBuf> {
        self.get(&format!("{PATHS_KEY}.{name}"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    /// List of strings at a dotted key; non-string items are skipped.
    #[must_use]
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Location of the result cache file.
    #[must_use]
    pub fn cache_file(&self) -> PathBuf {
        self.get_path("cache_file")
            .unwrap_or_else(|| self.root.join(DEFAULT_CACHE_FILE))
    }

    /// Blacklist keywords, after picking up any on-disk edits.
    pub fn blacklist_keywords(&mut self) -> ConfigResult<Vec<String>> {
        self.reload_if_changed()?;
        Ok(self.get_str_list(BLACKLIST_KEY))
    }

    /// Append a keyword to the blacklist and persist it.
    ///
    /// The keyword is written to the active file: the custom file when one is
    /// layered, the base file otherwise. Returns `false` if it was already
    /// present.
    pub fn add_blacklist_keyword(&mut self, keyword: &str) -> ConfigResult<bool> {
        let mut keywords = self.blacklist_keywords()?;
        if keywords.iter().any(|k| k == keyword) {
            return Ok(false);
        }
        keywords.push(keyword.to_string());

        let target = self
            .override_path
            .clone()
            .unwrap_or_else(|| self.base_path.clone());
        let mut document = match read_object(&target)? {
            Some(doc) => doc,
            None => defaults::builtin(),
        };
        *lookup_or_insert(&mut document, BLACKLIST_KEY) = Value::from(keywords);

        write_document(&target, &document)?;
        self.reload()?;

        log::info!("Added '{}' to blacklist in {}", keyword, target.display());
        Ok(true)
    }

    /// Closest existing dotted key to `key`, for "did you mean" hints.
    #[must_use]
    pub fn suggest_key(&self, key: &str) -> Option<String> {
        dotted_keys(&self.values)
            .into_iter()
            .map(|candidate| (strsim::jaro_winkler(key, &candidate), candidate))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate)
    }
}

/// Load and resolve a configuration without keeping any state.
///
/// # Errors
///
/// See [`ConfigError`].
pub fn load_config(root: &Path, base: &Path, custom: Option<&Path>) -> ConfigResult<Value> {
    let defaults = match read_object(base)? {
        Some(doc) => doc,
        None => {
            log::debug!(
                "No config file at {}, using built-in defaults",
                base.display()
            );
            defaults::builtin()
        }
    };

    let mut values = match custom {
        Some(path) => {
            let doc = read_object(path)?.ok_or_else(|| ConfigError::MissingOverride {
                path: path.to_path_buf(),
            })?;
            log::debug!("Layering custom config {}", path.display());
            merge::layer(defaults, doc)
        }
        None => defaults,
    };

    merge::resolve_paths(&mut values, root);
    Ok(values)
}

/// Parse a JSON object from `path`; `None` if the file does not exist.
fn read_object(path: &Path) -> ConfigResult<Option<Value>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if !value.is_object() {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        });
    }
    Ok(Some(value))
}

fn write_document(path: &Path, document: &Value) -> ConfigResult<()> {
    serde_json::to_vec_pretty(document)
        .map_err(std::io::Error::other)
        .and_then(|content| fsio::write_atomic(path, &content))
        .map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
}
