//! Command-line interface definitions.
//!
//! Global options (verbosity, color, project root, custom config) apply to
//! every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Look up a GUID and list what it references
//! assets-explorer find 1010017 --related
//!
//! # Use a partial override on top of config.json
//! assets-explorer --config my.json cache stats
//!
//! # Split assets.xml by template, then generate a mapping
//! assets-explorer unpack --templates '^Product'
//! assets-explorer map Product.xml --format json
//!
//! # Interactive browser
//! assets-explorer browse 1010017
//! ```

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Browse game asset GUIDs with a persistent lookup cache.
#[derive(Debug, Parser)]
#[command(name = "assets-explorer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Project root holding config.json (default: current directory)
    ///
    /// Relative paths in the configuration are resolved against it.
    #[arg(long, global = true, value_name = "DIR", env = "ASSETS_EXPLORER_ROOT")]
    pub root: Option<PathBuf>,

    /// Custom config file layered over config.json
    ///
    /// With `"partial": true` it is merged key by key, otherwise it replaces
    /// the base configuration.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Look up one or more GUIDs
    Find(FindArgs),
    /// Inspect or invalidate the lookup cache
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
    /// Inspect or edit the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Extract files from the game archive with RdaConsole
    Extract(ExtractArgs),
    /// Split assets.xml into smaller files
    Unpack(UnpackArgs),
    /// Generate a name-to-GUID mapping from a template file
    Map(MapArgs),
    /// Open the interactive asset browser
    Browse(BrowseArgs),
}

#[derive(Debug, Args)]
pub struct FindArgs {
    /// GUIDs to look up
    #[arg(value_name = "GUID", required = true)]
    pub guids: Vec<String>,

    /// Also list the GUIDs each asset references
    #[arg(short, long)]
    pub related: bool,

    /// Keep only related entries whose element or context matches this regex
    #[arg(long, value_name = "REGEX", requires = "related")]
    pub filter: Option<String>,

    /// Do not hide related entries matching the configured blacklist
    #[arg(long, requires = "related")]
    pub no_blacklist: bool,

    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show record counts and cache file details
    Stats {
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// Remove every cached record
    Clear,
    /// Remove cached "not found" markers so those GUIDs are searched again
    ClearNotFound,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration, or one dotted key of it
    Print {
        /// Dotted key such as `paths.cache_file`
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Show which config files are in use
    Status,
    /// Add a keyword to the related-GUID blacklist
    AddKeyword {
        #[arg(value_name = "KEYWORD")]
        keyword: String,
    },
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Archive to extract from (default: paths.input_rda_file)
    #[arg(short, long, value_name = "RDA")]
    pub input: Option<PathBuf>,

    /// Output directory (default: paths.unpacked_dir)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// File filter regex passed to the tool (default: extract.filter_pattern)
    #[arg(long, value_name = "REGEX", conflicts_with = "all")]
    pub filter: Option<String>,

    /// Extract everything, ignoring the configured filter
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("selection").required(true).args(["templates", "guids"])))]
pub struct UnpackArgs {
    /// Group by template; an optional regex limits which templates are kept
    #[arg(long, value_name = "REGEX", num_args = 0..=1)]
    pub templates: Option<Option<String>>,

    /// Comma-separated GUIDs to extract, one file each
    #[arg(long, value_name = "GUIDS", value_delimiter = ',')]
    pub guids: Vec<String>,

    /// Write everything into a single merged/<NAME>.xml instead
    #[arg(long, value_name = "NAME")]
    pub merge: Option<String>,

    /// Source file (default: paths.assets_xml)
    #[arg(long, value_name = "FILE")]
    pub assets_xml: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MapArgs {
    /// Template file name inside the assets directory, e.g. `Product.xml`
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    #[arg(short, long, value_enum, default_value = "python")]
    pub format: MapFormat,

    /// Keep only asset names matching this regex
    #[arg(long, value_name = "REGEX")]
    pub filter: Option<String>,
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// GUID to open on start
    #[arg(value_name = "GUID")]
    pub guid: Option<String>,
}

/// Output format for `find` and `cache stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored text
    Text,
    /// JSON for scripting
    Json,
}

/// Output format for generated mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MapFormat {
    /// A Python module with one dict constant
    Python,
    /// A JSON object
    Json,
}

impl MapFormat {
    /// File extension of generated files.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            MapFormat::Python => "py",
            MapFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
