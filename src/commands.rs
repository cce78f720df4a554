//! Subcommand implementations.
//!
//! Each command takes the loaded [`ConfigStore`] and a writer for its
//! human or JSON output, so it can be driven from tests without a terminal.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use bytesize::ByteSize;
use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use yansi::Paint;

use crate::assets::{self, AssetFinder, RelatedRef, UnpackMode, UnpackOptions};
use crate::cache::{AssetInfo, CacheRecord, CacheStats, ResultCache};
use crate::cli::{
    CacheCommand, ConfigCommand, ExtractArgs, FindArgs, MapArgs, OutputFormat, UnpackArgs,
};
use crate::config::ConfigStore;
use crate::error::ExitCode;
use crate::extract::{self, ExtractOptions};
use crate::filter;

/// Config key of the default RdaConsole filter.
const EXTRACT_FILTER_KEY: &str = "extract.filter_pattern";

/// A `paths.<name>` entry that the command cannot run without.
fn require_path(config: &ConfigStore, name: &str) -> Result<PathBuf> {
    config
        .get_path(name)
        .ok_or_else(|| anyhow!("paths.{name} is not set in the configuration"))
}

/// Finder over the configured templates directory and cache file.
pub fn open_finder(config: &ConfigStore) -> Result<AssetFinder> {
    let assets_dir = require_path(config, "assets_unpack_dir")?;
    let cache = ResultCache::open(config.cache_file());
    Ok(AssetFinder::new(cache, assets_dir))
}

// ==================== find ====================

#[derive(Debug, Serialize)]
struct FindResult {
    guid: String,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset: Option<AssetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    related: Option<Vec<RelatedRef>>,
}

/// Look up each GUID; [`ExitCode::NotFound`] if any of them is missing.
pub fn run_find(config: &mut ConfigStore, args: &FindArgs, out: &mut impl Write) -> Result<ExitCode> {
    let mut finder = open_finder(config)?;
    let blacklist = if args.related && !args.no_blacklist {
        filter::build_pattern(&config.blacklist_keywords()?)
    } else {
        None
    };

    let mut results = Vec::with_capacity(args.guids.len());
    for guid in &args.guids {
        let guid = guid.trim().to_string();
        let asset = finder.find(&guid);
        let related = match (&asset, args.related) {
            (Some(_), true) => {
                let refs = finder.related(&guid);
                let refs = filter::apply_blacklist(refs, blacklist.as_deref());
                Some(filter::apply_include(refs, args.filter.as_deref()))
            }
            _ => None,
        };
        results.push(FindResult {
            found: asset.is_some(),
            guid,
            asset,
            related,
        });
    }

    match args.output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &results)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for result in &results {
                write_find_text(&mut finder, result, out)?;
            }
        }
    }

    if results.iter().all(|r| r.found) {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::NotFound)
    }
}

fn write_find_text(
    finder: &mut AssetFinder,
    result: &FindResult,
    out: &mut impl Write,
) -> Result<()> {
    let Some(asset) = &result.asset else {
        writeln!(out, "{} {}", result.guid.bold(), "not found".red())?;
        return Ok(());
    };

    writeln!(
        out,
        "{} {} ({}) in {}",
        asset.guid.bold(),
        asset.name.green(),
        asset.template,
        asset.file.dim()
    )?;

    if let Some(related) = &result.related {
        for r in related {
            let line = format!("{} ({})", r.element_name, r.context);
            match finder.cache_mut().get(&r.guid) {
                Some(CacheRecord::Found(target)) => {
                    writeln!(out, "  {:<10} {:<30} {}", r.guid, target.name.cyan(), line)?;
                }
                Some(CacheRecord::NotFound) => {
                    writeln!(out, "  {:<10} {:<30} {}", r.guid.dim(), "(not found)".dim(), line.dim())?;
                }
                None => writeln!(out, "  {:<10} {:<30} {}", r.guid, "?", line)?,
            }
        }
    }
    Ok(())
}

// ==================== cache ====================

#[derive(Debug, Serialize)]
struct CacheReport {
    path: PathBuf,
    size_bytes: u64,
    modified: Option<DateTime<Local>>,
    #[serde(flatten)]
    stats: CacheStats,
}

pub fn run_cache(config: &ConfigStore, action: &CacheCommand, out: &mut impl Write) -> Result<ExitCode> {
    let mut cache = ResultCache::open(config.cache_file());

    match action {
        CacheCommand::Stats { output } => {
            let report = CacheReport {
                stats: cache.stats(),
                size_bytes: fs::metadata(cache.path()).map(|m| m.len()).unwrap_or(0),
                modified: cache.last_modified().map(DateTime::<Local>::from),
                path: cache.path().to_path_buf(),
            };
            match output {
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &report)?;
                    writeln!(out)?;
                }
                OutputFormat::Text => write_cache_text(&report, out)?,
            }
        }
        CacheCommand::Clear => {
            cache
                .clear_all()
                .with_context(|| format!("clearing {}", cache.path().display()))?;
            writeln!(out, "Cleared all cache entries")?;
        }
        CacheCommand::ClearNotFound => {
            let removed = cache
                .clear_not_found()
                .with_context(|| format!("clearing {}", cache.path().display()))?;
            writeln!(out, "Removed {} not-found entries", removed.bold())?;
        }
    }
    Ok(ExitCode::Success)
}

fn write_cache_text(report: &CacheReport, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}  {}", "Cache file:".bold(), report.path.display())?;
    match report.modified {
        Some(modified) => {
            writeln!(
                out,
                "{}  {}",
                "Size:".bold(),
                ByteSize::b(report.size_bytes)
            )?;
            writeln!(
                out,
                "{}  {}",
                "Modified:".bold(),
                modified.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        None => writeln!(out, "{}", "(not created yet)".dim())?,
    }
    writeln!(out, "{}  {}", "Found:".bold(), report.stats.found.green())?;
    writeln!(out, "{}  {}", "Not found:".bold(), report.stats.not_found.yellow())?;
    writeln!(out, "{}  {}", "Total:".bold(), report.stats.total)?;
    Ok(())
}

// ==================== config ====================

pub fn run_config(config: &mut ConfigStore, action: &ConfigCommand, out: &mut impl Write) -> Result<ExitCode> {
    match action {
        ConfigCommand::Print { key: None } => {
            serde_json::to_writer_pretty(&mut *out, config.values())?;
            writeln!(out)?;
        }
        ConfigCommand::Print { key: Some(key) } => {
            let Some(value) = config.get(key) else {
                match config.suggest_key(key) {
                    Some(suggestion) => {
                        bail!("unknown config key '{key}' (did you mean '{suggestion}'?)")
                    }
                    None => bail!("unknown config key '{key}'"),
                }
            };
            match value {
                serde_json::Value::String(s) => writeln!(out, "{s}")?,
                other => {
                    serde_json::to_writer_pretty(&mut *out, other)?;
                    writeln!(out)?;
                }
            }
        }
        ConfigCommand::Status => {
            writeln!(out, "{}  {}", "Project root:".bold(), config.root().display())?;
            let base_state = if config.has_base_file() {
                "in use".green().to_string()
            } else {
                "missing, using built-in defaults".yellow().to_string()
            };
            writeln!(
                out,
                "{}  {} ({})",
                "Base config:".bold(),
                config.base_path().display(),
                base_state
            )?;
            if let Some(path) = config.override_path() {
                writeln!(out, "{}  {}", "Custom config:".bold(), path.display())?;
            }
            writeln!(out, "{}  {}", "Cache file:".bold(), config.cache_file().display())?;
            let keywords = config.blacklist_keywords()?;
            writeln!(
                out,
                "{}  {}",
                "Blacklist:".bold(),
                if keywords.is_empty() {
                    "(empty)".to_string()
                } else {
                    keywords.join(", ")
                }
            )?;
        }
        ConfigCommand::AddKeyword { keyword } => {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                bail!("keyword must not be empty");
            }
            if config.add_blacklist_keyword(keyword)? {
                writeln!(out, "Added '{}' to the blacklist", keyword.bold())?;
            } else {
                writeln!(out, "'{}' is already blacklisted", keyword)?;
            }
        }
    }
    Ok(ExitCode::Success)
}

// ==================== extract / unpack / map ====================

pub fn run_extract(config: &ConfigStore, args: &ExtractArgs, out: &mut impl Write) -> Result<ExitCode> {
    let options = ExtractOptions {
        tool: require_path(config, "rda_console_file")?,
        input: match &args.input {
            Some(path) => path.clone(),
            None => require_path(config, "input_rda_file")?,
        },
        output: match &args.output {
            Some(path) => path.clone(),
            None => require_path(config, "unpacked_dir")?,
        },
        filter: if args.all {
            None
        } else {
            args.filter
                .clone()
                .or_else(|| config.get_str(EXTRACT_FILTER_KEY))
        },
    };

    extract::extract(&options)?;
    writeln!(out, "Extracted into {}", options.output.display())?;
    Ok(ExitCode::Success)
}

pub fn run_unpack(config: &ConfigStore, args: &UnpackArgs, out: &mut impl Write) -> Result<ExitCode> {
    let mode = if args.guids.is_empty() {
        UnpackMode::Templates(args.templates.clone().flatten())
    } else {
        UnpackMode::Guids(args.guids.clone())
    };
    let options = UnpackOptions {
        assets_xml: match &args.assets_xml {
            Some(path) => path.clone(),
            None => require_path(config, "assets_xml")?,
        },
        output_dir: require_path(config, "unpacked_dir")?,
        mode,
        merge: args.merge.clone(),
    };

    let report = assets::unpack(&options)?;
    writeln!(
        out,
        "Wrote {} assets to {} files under {}",
        report.assets.bold(),
        report.files.len(),
        options.output_dir.display()
    )?;
    Ok(ExitCode::Success)
}

pub fn run_map(config: &ConfigStore, args: &MapArgs, out: &mut impl Write) -> Result<ExitCode> {
    let file_name = if args.template.ends_with(".xml") {
        args.template.clone()
    } else {
        format!("{}.xml", args.template)
    };
    let template_file = require_path(config, "assets_unpack_dir")?.join(file_name);
    let gen_dir = require_path(config, "gen_dir")?;
    let filter = args
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --filter pattern")?;

    let (path, count) = assets::write_mapping(&template_file, &gen_dir, args.format, filter.as_ref())?;
    writeln!(out, "Wrote {} entries to {}", count.bold(), path.display())?;
    Ok(ExitCode::Success)
}
