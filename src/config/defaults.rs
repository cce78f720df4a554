//! Built-in configuration used when no `config.json` exists.

use serde_json::{json, Value};

/// Name of the base configuration file, relative to the project root.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Key holding the blacklist keywords applied to related-GUID lists.
pub const BLACKLIST_KEY: &str = "ui.related_filter_keywords";

/// Key holding the cache file location.
pub const CACHE_FILE_KEY: &str = "paths.cache_file";

/// Default cache location when the config does not name one.
pub const DEFAULT_CACHE_FILE: &str = ".cache/cache.json";

/// The default configuration document.
///
/// Paths are relative here and resolved against the project root on load.
#[must_use]
pub fn builtin() -> Value {
    json!({
        "paths": {
            "workdir": ".",
            "unpacked_dir": "unpacked",
            "rda_console_file": "tools/RdaConsole.exe",
            "input_rda_file": "data/config.rda",
            "assets_xml": "unpacked/data/base/config/export/assets.xml",
            "assets_unpack_dir": "unpacked/templates",
            "gen_dir": "gen",
            "cache_file": DEFAULT_CACHE_FILE
        },
        "extract": {
            "filter_pattern": "assets\\.xml"
        },
        "ui": {
            "related_filter_keywords": []
        }
    })
}
