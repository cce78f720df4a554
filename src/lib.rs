//! Assets Explorer - GUID lookup and asset tooling for game data dumps
//!
//! Resolves asset GUIDs against unpacked template XML, remembers every
//! lookup in a persistent result cache, and ships the supporting tools:
//! RDA extraction, splitting `assets.xml` into templates, name-to-GUID
//! mapping generation, and an interactive browser over related GUIDs.

pub mod assets;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod fsio;
pub mod logging;
pub mod tui;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Context;

use crate::cli::{Cli, Commands};
use crate::config::ConfigStore;
use crate::error::ExitCode;
use crate::logging::LogTarget;

/// Where the browser logs while it owns the terminal.
const BROWSE_LOG_FILE: &str = ".cache/explorer.log";

/// Run the command selected on the command line.
///
/// # Errors
///
/// Any failure that should end the process with a general error.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let root: PathBuf = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine the working directory")?,
    };

    let log_target = match cli.command {
        Commands::Browse(_) => LogTarget::File(root.join(BROWSE_LOG_FILE)),
        _ => LogTarget::Stderr,
    };
    logging::init_logging(cli.verbose, cli.quiet, &log_target)
        .context("failed to initialize logging")?;

    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    log::debug!("Project root: {}", root.display());
    let mut config = ConfigStore::open(&root, cli.config.clone())
        .with_context(|| format!("failed to load configuration from {}", root.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Find(args) => commands::run_find(&mut config, args, &mut out),
        Commands::Cache { action } => commands::run_cache(&config, action, &mut out),
        Commands::Config { action } => commands::run_config(&mut config, action, &mut out),
        Commands::Extract(args) => commands::run_extract(&config, args, &mut out),
        Commands::Unpack(args) => commands::run_unpack(&config, args, &mut out),
        Commands::Map(args) => commands::run_map(&config, args, &mut out),
        Commands::Browse(args) => {
            drop(out);
            let mut finder = commands::open_finder(&config)?;
            let mut app = tui::App::new();
            if let Some(guid) = &args.guid {
                app.request_open(guid);
            }
            tui::run_tui(&mut app, &mut finder, &mut config)?;
            Ok(ExitCode::Success)
        }
    }
}
