//! Application configuration management.
//!
//! Configuration lives in a JSON file (`config.json` at the project root) and
//! may be layered with a custom file passed on the command line.
//!
//! # Layering
//!
//! * No base file: the built-in defaults from [`defaults`] are used.
//! * Custom file with `"partial": true`: deep-merged onto the base, leaves win.
//! * Custom file without it: replaces the base entirely.
//!
//! After layering, every string under a `paths` object is made absolute
//! against the project root. See [`merge`] for the pure functions and
//! [`store`] for the reloading [`ConfigStore`].

pub mod defaults;
pub mod merge;
pub mod store;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use merge::{deep_merge, layer, lookup, resolve_paths};
pub use store::{load_config, ConfigStore};

/// Errors raised while loading or persisting configuration.
///
/// All of these are fatal for the command that triggered them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON.
    #[error("malformed JSON in config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is valid JSON but its top level is not an object.
    #[error("config file {} must contain a JSON object", .path.display())]
    NotAnObject { path: PathBuf },

    /// A custom config file was requested but does not exist.
    #[error("custom config file not found: {}", .path.display())]
    MissingOverride { path: PathBuf },

    /// Persisting a change back to disk failed.
    #[error("failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
