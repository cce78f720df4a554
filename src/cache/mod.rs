//! Lookup result caching.
//!
//! Scanning the asset XML for a GUID is the slow path of every command, so
//! each outcome is remembered in a JSON file shared between CLI invocations
//! and a running browser session.
//!
//! # Architecture
//!
//! * [`entry`]: the record model (`Found` payload or `NotFound` marker).
//! * [`store`]: the file-backed [`ResultCache`] with mtime-based reloads.
//!
//! # Cache Invalidation
//!
//! The file's modification time is compared with the time recorded at the
//! last load before every read and mutation. A newer file is re-parsed whole.
//! Records are never validated individually: they are cheap to re-derive, so
//! `clear-not-found` and `clear` are the only invalidation tools.

pub mod entry;
pub mod store;

pub use entry::{AssetInfo, CacheRecord, CacheStats};
pub use store::{CacheError, CacheResult, ResultCache};
