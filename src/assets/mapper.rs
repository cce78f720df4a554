//! Name-to-GUID mapping generation.
//!
//! Turns one template file into a lookup table that mod scripts can import,
//! either as a Python dict constant or as a JSON object.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use super::xml;
use crate::cli::MapFormat;
use crate::fsio;

/// Errors from mapping generation.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("template file not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("XML parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One `name -> guid` line of the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub name: String,
    pub guid: String,
}

/// Collect named assets from a template file, in document order.
///
/// Assets without a name are skipped, and so are repeated names (the first
/// one wins). With a filter, only names matching it are kept.
pub fn collect_entries(
    template_file: &Path,
    filter: Option<&Regex>,
) -> Result<Vec<MappingEntry>, MapperError> {
    if !template_file.is_file() {
        return Err(MapperError::Missing {
            path: template_file.to_path_buf(),
        });
    }
    let text = fs::read_to_string(template_file).map_err(|source| MapperError::Read {
        path: template_file.to_path_buf(),
        source,
    })?;
    let doc = xml::parse(&text).map_err(|source| MapperError::Parse {
        path: template_file.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for asset in xml::all_assets(&doc) {
        let (Some(guid), Some(name)) = (xml::asset_guid(asset), xml::asset_name(asset)) else {
            continue;
        };
        if filter.is_some_and(|re| !re.is_match(name)) {
            continue;
        }
        if !seen.insert(name.to_string()) {
            log::debug!("Duplicate name '{}' (GUID {}) skipped", name, guid);
            continue;
        }
        entries.push(MappingEntry {
            name: name.to_string(),
            guid: guid.to_string(),
        });
    }
    Ok(entries)
}

/// `AssetPoolNamed.xml` -> `ASSET_POOL_NAMED`.
#[must_use]
pub fn constant_name(template_file_name: &str) -> String {
    let stem = template_file_name
        .strip_suffix(".xml")
        .unwrap_or(template_file_name);

    let mut out = String::with_capacity(stem.len() + 8);
    for c in stem.chars() {
        let word_break = c.is_uppercase() || !c.is_alphanumeric();
        if word_break && !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        if c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        }
    }
    out
}

/// Render a mapping in the requested format.
#[must_use]
pub fn render(entries: &[MappingEntry], constant: &str, source: &str, format: MapFormat) -> String {
    match format {
        MapFormat::Python => {
            let mut out = format!("# Generated from {source}\n{constant} = {{\n");
            for entry in entries {
                let key = Value::from(entry.name.as_str()).to_string();
                out.push_str(&format!("    {}: {},\n", key, guid_literal(&entry.guid)));
            }
            out.push_str("}\n");
            out
        }
        MapFormat::Json => {
            let map: Map<String, Value> = entries
                .iter()
                .map(|e| (e.name.clone(), guid_value(&e.guid)))
                .collect();
            let mut out = serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default();
            out.push('\n');
            out
        }
    }
}

/// Generate the mapping for `template_file` into `gen_dir`.
///
/// Returns the written path and the number of entries.
pub fn write_mapping(
    template_file: &Path,
    gen_dir: &Path,
    format: MapFormat,
    filter: Option<&Regex>,
) -> Result<(PathBuf, usize), MapperError> {
    let entries = collect_entries(template_file, filter)?;
    let file_name = template_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let constant = constant_name(&file_name);

    let out_path = gen_dir.join(format!(
        "{}.{}",
        constant.to_lowercase(),
        format.extension()
    ));
    let content = render(&entries, &constant, &file_name, format);
    fsio::write_atomic(&out_path, content.as_bytes()).map_err(|source| MapperError::Write {
        path: out_path.clone(),
        source,
    })?;

    log::info!(
        "Wrote {} mappings from {} to {}",
        entries.len(),
        file_name,
        out_path.display()
    );
    Ok((out_path, entries.len()))
}

fn guid_value(guid: &str) -> Value {
    guid.parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(guid))
}

fn guid_literal(guid: &str) -> String {
    guid_value(guid).to_string()
}
