//! Cache record definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of an asset as found in the unpacked template XML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// The asset GUID.
    pub guid: String,
    /// `Values/Standard/Name`, or `Unknown`.
    pub name: String,
    /// `Template`, or `Unknown`.
    pub template: String,
    /// File name (not path) of the template XML the asset lives in.
    pub file: String,
}

/// Outcome of one lookup.
///
/// Serialized with a `status` discriminator:
/// `{"status": "found", "guid": ..., ...}` or `{"status": "not_found"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheRecord {
    /// The GUID resolved to an asset.
    Found(AssetInfo),
    /// The GUID was searched for and does not exist.
    NotFound,
}

impl CacheRecord {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// The payload of a `Found` record.
    #[must_use]
    pub fn asset(&self) -> Option<&AssetInfo> {
        match self {
            Self::Found(info) => Some(info),
            Self::NotFound => None,
        }
    }

    #[must_use]
    pub fn into_asset(self) -> Option<AssetInfo> {
        match self {
            Self::Found(info) => Some(info),
            Self::NotFound => None,
        }
    }

    /// Decode one stored entry.
    ///
    /// Accepts the tagged format and the untagged one written by older
    /// releases (`{"not_found": true}` or a bare payload). Returns `None` for
    /// anything else.
    #[must_use]
    pub fn decode(value: Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.contains_key("status") {
            return serde_json::from_value(value).ok();
        }
        if object.get("not_found").and_then(Value::as_bool) == Some(true) {
            return Some(Self::NotFound);
        }
        serde_json::from_value::<AssetInfo>(value).ok().map(Self::Found)
    }
}

/// Record counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub found: usize,
    pub not_found: usize,
    pub total: usize,
}
