//! GUID lookup over the unpacked template files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;
use serde::Serialize;
use walkdir::WalkDir;

use super::xml;
use crate::cache::{AssetInfo, CacheRecord, ResultCache};

/// A numeric value inside an asset that may reference another asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedRef {
    /// The referenced GUID.
    pub guid: String,
    /// Tag of the element holding the value.
    pub element_name: String,
    /// Tag of that element's parent.
    pub context: String,
}

/// Finds assets by GUID, consulting and filling the [`ResultCache`].
///
/// Cache write failures are logged and never fail a lookup.
#[derive(Debug)]
pub struct AssetFinder {
    cache: ResultCache,
    assets_dir: PathBuf,
}

impl AssetFinder {
    #[must_use]
    pub fn new(cache: ResultCache, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache,
            assets_dir: assets_dir.into(),
        }
    }

    #[must_use]
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResultCache {
        &mut self.cache
    }

    /// Template XML files in the assets directory, sorted by name.
    #[must_use]
    pub fn template_files(&self) -> Vec<PathBuf> {
        template_files(&self.assets_dir)
    }

    /// Look up an asset.
    ///
    /// A cached `NotFound` answers `None` without scanning. On a cache miss the
    /// template files are scanned in name order; the first match wins and
    /// every asset of the matching file is cached in the same write. A miss
    /// is cached as `NotFound`, unless the assets directory does not exist.
    pub fn find(&mut self, guid: &str) -> Option<AssetInfo> {
        let guid = guid.trim();
        if guid.is_empty() {
            return None;
        }

        match self.cache.get(guid) {
            Some(CacheRecord::Found(asset)) => return Some(asset),
            Some(CacheRecord::NotFound) => return None,
            None => {}
        }

        if !self.assets_dir.is_dir() {
            log::warn!(
                "Assets directory not found: {}",
                self.assets_dir.display()
            );
            return None;
        }

        match self.scan(guid) {
            Some((asset, file_assets)) => {
                log::debug!(
                    "Found {} in {}, caching {} assets from that file",
                    guid,
                    asset.file,
                    file_assets.len()
                );
                if let Err(e) = self.cache.extend_found(file_assets) {
                    log::warn!("Could not cache lookup result: {e}");
                }
                Some(asset)
            }
            None => {
                log::debug!("GUID {} not found in any template", guid);
                if let Err(e) = self.cache.put_not_found(guid) {
                    log::warn!("Could not cache lookup result: {e}");
                }
                None
            }
        }
    }

    /// Whether `guid` is cached as missing. Never scans.
    pub fn is_known_missing(&mut self, guid: &str) -> bool {
        self.cache.is_not_found(guid.trim())
    }

    /// Numeric values inside the asset that may be GUIDs of other assets.
    ///
    /// Walks every section of `Values` except `Standard`. Skips `0`, `1`, the
    /// asset's own GUID and repeats. Empty if the asset cannot be found.
    pub fn related(&mut self, guid: &str) -> Vec<RelatedRef> {
        let guid = guid.trim();
        let Some(asset) = self.find(guid) else {
            return Vec::new();
        };

        let path = self.assets_dir.join(&asset.file);
        let Some(text) = read_xml(&path) else {
            return Vec::new();
        };
        let doc = match xml::parse(&text) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("Error parsing {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        let Some(node) = xml::top_level_assets(&doc).find(|a| xml::asset_guid(*a) == Some(guid))
        else {
            log::warn!("Cached asset {} no longer present in {}", guid, asset.file);
            return Vec::new();
        };

        let mut related = Vec::new();
        let mut seen = HashSet::new();
        if let Some(values) = xml::child(node, "Values") {
            for section in values.children().filter(|n| n.is_element()) {
                let tag = section.tag_name().name();
                if tag != "Standard" {
                    collect_numeric(section, tag, guid, &mut seen, &mut related);
                }
            }
        }
        related
    }

    /// First asset matching `guid`, with every asset of its file.
    fn scan(&self, guid: &str) -> Option<(AssetInfo, Vec<AssetInfo>)> {
        for path in self.template_files() {
            let Some(text) = read_xml(&path) else {
                continue;
            };
            let doc = match xml::parse(&text) {
                Ok(doc) => doc,
                Err(e) => {
                    log::warn!("Error parsing {}: {}", path.display(), e);
                    continue;
                }
            };

            if !xml::top_level_assets(&doc).any(|a| xml::asset_guid(a) == Some(guid)) {
                continue;
            }

            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file_assets: Vec<AssetInfo> = xml::top_level_assets(&doc)
                .filter_map(|a| xml::asset_info(a, &file_name))
                .collect();
            let found = file_assets.iter().find(|a| a.guid == guid).cloned();
            return found.map(|asset| (asset, file_assets));
        }
        None
    }
}

/// `*.xml` files directly inside `dir`, sorted by name.
#[must_use]
pub fn template_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        })
        .collect()
}

fn read_xml(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("Error reading {}: {}", path.display(), e);
            None
        }
    }
}

fn collect_numeric(
    node: Node<'_, '_>,
    parent: &str,
    own_guid: &str,
    seen: &mut HashSet<String>,
    out: &mut Vec<RelatedRef>,
) {
    if let Some(value) = xml::text(node) {
        let is_number = value.chars().all(|c| c.is_ascii_digit());
        if is_number && value != own_guid && value != "0" && value != "1" && seen.insert(value.to_string()) {
            out.push(RelatedRef {
                guid: value.to_string(),
                element_name: node.tag_name().name().to_string(),
                context: parent.to_string(),
            });
        }
    }

    let tag = node.tag_name().name();
    for child in node.children().filter(|n| n.is_element()) {
        collect_numeric(child, tag, own_guid, seen, out);
    }
}
