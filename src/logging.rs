//! Logging setup for the `log` facade with an `env_logger` backend.
//!
//! The level comes from `RUST_LOG` when set, otherwise from `-q`/`-v`:
//! quiet shows errors only, no flag shows info, `-v` debug and `-vv` trace.
//!
//! Command-line runs log to stderr. The browser owns the terminal, so it
//! sends records to a file instead (see [`LogTarget::File`]).

use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to a file, creating it and its parent directory if needed.
    File(PathBuf),
}

/// Initialize the global logger.
///
/// Calling it twice is harmless: the second call leaves the first logger in
/// place.
///
/// # Errors
///
/// Fails only if a log file was requested and cannot be opened.
pub fn init_logging(verbose: u8, quiet: bool, target: &LogTarget) -> io::Result<()> {
    let from_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    match target {
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
            configure_format(&mut builder, verbose, true);
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
            configure_format(&mut builder, verbose, false);
        }
    }

    if builder.try_init().is_err() {
        return Ok(());
    }

    if from_env {
        log::debug!(
            "Logging initialized from RUST_LOG: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        );
    }
    Ok(())
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Debug builds and log files get timestamps; `-v` adds the module path.
fn configure_format(builder: &mut Builder, verbose: u8, styled: bool) {
    let timestamps = cfg!(debug_assertions) || !styled;

    builder.format(move |buf, record| {
        let level = record.level();
        let style = if styled {
            buf.default_level_style(level)
        } else {
            env_logger::fmt::style::Style::new()
        };

        if timestamps {
            write!(buf, "{} ", buf.timestamp_seconds())?;
        }
        write!(buf, "{style}{level:<5}{style:#} ")?;
        if verbose >= 1 {
            write!(buf, "[{}] ", record.module_path().unwrap_or("unknown"))?;
        }
        writeln!(buf, "{}", record.args())
    });
}
