//! Archive extraction through the external RdaConsole tool.
//!
//! The tool is run as
//! `<tool> extract -f <rda> -y -o <outdir> [--filter <regex>]`
//! and awaited; its own output goes straight to the terminal.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use thiserror::Error;

/// Errors from running the extraction tool.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("RdaConsole not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("input archive not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start {}: {source}", .tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("extraction failed with {status}")]
    Failed { status: ExitStatus },
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Path to the RdaConsole executable.
    pub tool: PathBuf,
    /// The `.rda` archive.
    pub input: PathBuf,
    pub output: PathBuf,
    /// Regex selecting archive entries; everything when `None`.
    pub filter: Option<String>,
}

/// Build the tool invocation without running it.
#[must_use]
pub fn build_command(options: &ExtractOptions) -> Command {
    let mut cmd = Command::new(&options.tool);
    cmd.arg("extract")
        .arg("-f")
        .arg(&options.input)
        .arg("-y")
        .arg("-o")
        .arg(&options.output);
    if let Some(filter) = options.filter.as_deref().filter(|f| !f.is_empty()) {
        cmd.arg("--filter").arg(filter);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        // CREATE_NEW_CONSOLE
        cmd.creation_flags(0x0000_0010);
    }

    cmd
}

/// Run the extraction and wait for it.
///
/// # Errors
///
/// Fails if the tool or archive is missing, the output directory cannot be
/// created, the tool cannot be started, or it exits unsuccessfully.
pub fn extract(options: &ExtractOptions) -> Result<(), ExtractError> {
    if !options.tool.is_file() {
        return Err(ExtractError::ToolNotFound(options.tool.clone()));
    }
    if !options.input.is_file() {
        return Err(ExtractError::InputNotFound(options.input.clone()));
    }
    fs::create_dir_all(&options.output).map_err(|source| ExtractError::CreateOutput {
        path: options.output.clone(),
        source,
    })?;

    log::info!(
        "Extracting {} into {}",
        options.input.display(),
        options.output.display()
    );
    let status = build_command(options)
        .status()
        .map_err(|source| ExtractError::Spawn {
            tool: options.tool.clone(),
            source,
        })?;

    if !status.success() {
        return Err(ExtractError::Failed { status });
    }
    log::info!("Extraction finished");
    Ok(())
}
