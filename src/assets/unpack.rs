//! Split the game's single `assets.xml` into smaller files.
//!
//! Assets are grouped either by `Template` (optionally filtered by a regex) or
//! by GUID, and written as one file per group under the unpack directory, or
//! all together into one merged file.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

use super::xml;
use crate::fsio;

/// Characters that are not allowed in Windows file names.
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Errors from unpacking.
#[derive(Debug, Error)]
pub enum UnpackError {
    #[error("assets file not found: {}", .path.display())]
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

    #[error("invalid template filter: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How assets are selected and grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnpackMode {
    /// Group by template name, keeping templates that match the regex (all if `None`).
    Templates(Option<String>),
    /// Group by GUID, keeping only the listed GUIDs.
    Guids(Vec<String>),
}

impl UnpackMode {
    /// Name of the output subdirectory for this mode.
    #[must_use]
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Templates(_) => "templates",
            Self::Guids(_) => "guids",
        }
    }
}

/// Options for [`unpack`].
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// The source `assets.xml`.
    pub assets_xml: PathBuf,
    /// Unpack root; files land in a mode-specific subdirectory.
    pub output_dir: PathBuf,
    pub mode: UnpackMode,
    /// Write every selected asset into `merged/<name>.xml` instead.
    pub merge: Option<String>,
}

/// What an unpack run produced.
#[derive(Debug, Clone, Default)]
pub struct UnpackReport {
    /// Number of assets written.
    pub assets: usize,
    /// Files written, in write order.
    pub files: Vec<PathBuf>,
}

/// Run an unpack.
///
/// # Errors
///
/// Fails if the source is missing or malformed, the filter is not a valid
/// regex, or an output file cannot be written.
pub fn unpack(options: &UnpackOptions) -> Result<UnpackReport, UnpackError> {
    let source = &options.assets_xml;
    if !source.is_file() {
        return Err(UnpackError::Missing {
            path: source.clone(),
        });
    }

    log::info!("Loading {}", source.display());
    let text = fs::read_to_string(source).map_err(|e| UnpackError::Read {
        path: source.clone(),
        source: e,
    })?;
    let doc = xml::parse(&text).map_err(|e| UnpackError::Parse {
        path: source.clone(),
        source: e,
    })?;

    let groups = select(&doc, &text, &options.mode)?;
    let assets: usize = groups.values().map(Vec::len).sum();
    log::info!("Selected {} assets in {} groups", assets, groups.len());

    let mut report = UnpackReport {
        assets,
        files: Vec::new(),
    };

    match &options.merge {
        Some(name) => {
            let dir = options.output_dir.join("merged");
            let path = dir.join(format!("{}.xml", sanitize_file_name(name)));
            let all: Vec<&str> = groups.into_values().flatten().collect();
            write_assets(&path, &all)?;
            report.files.push(path);
        }
        None => {
            let dir = options.output_dir.join(options.mode.dir_name());
            for (key, raw_assets) in &groups {
                let path = dir.join(format!("{}.xml", sanitize_file_name(key)));
                write_assets(&path, raw_assets)?;
                report.files.push(path);
            }
        }
    }

    Ok(report)
}

/// Selected assets' source text, grouped by template or GUID.
fn select<'t>(
    doc: &roxmltree::Document<'t>,
    text: &'t str,
    mode: &UnpackMode,
) -> Result<BTreeMap<String, Vec<&'t str>>, UnpackError> {
    let mut groups: BTreeMap<String, Vec<&'t str>> = BTreeMap::new();

    match mode {
        UnpackMode::Templates(filter) => {
            let pattern = filter.as_deref().map(Regex::new).transpose()?;
            for asset in xml::all_assets(doc) {
                let Some(template) = xml::asset_template(asset) else {
                    continue;
                };
                if pattern.as_ref().is_some_and(|re| !re.is_match(template)) {
                    continue;
                }
                groups
                    .entry(template.to_string())
                    .or_default()
                    .push(xml::source_text(text, asset));
            }
        }
        UnpackMode::Guids(guids) => {
            let wanted: HashSet<&str> = guids.iter().map(|g| g.trim()).collect();
            for asset in xml::all_assets(doc) {
                let Some(guid) = xml::asset_guid(asset) else {
                    continue;
                };
                if wanted.contains(guid) {
                    groups
                        .entry(guid.to_string())
                        .or_default()
                        .push(xml::source_text(text, asset));
                }
            }
        }
    }

    Ok(groups)
}

fn write_assets(path: &Path, raw_assets: &[&str]) -> Result<(), UnpackError> {
    let mut out = String::from("<?xml version='1.0' encoding='utf-8'?>\n<Assets>\n");
    for raw in raw_assets {
        out.push_str("  ");
        out.push_str(raw);
        out.push('\n');
    }
    out.push_str("</Assets>\n");

    fsio::write_atomic(path, out.as_bytes()).map_err(|e| UnpackError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::debug!("Wrote {} assets to {}", raw_assets.len(), path.display());
    Ok(())
}

/// Replace characters that Windows forbids in file names with `_`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
