//! Asset XML handling.
//!
//! * [`xml`]: shared accessors over the `<Asset>` document shape.
//! * [`finder`]: cached GUID lookup and related-GUID discovery.
//! * [`unpack`]: split the game's `assets.xml` into per-template files.
//! * [`mapper`]: generate name-to-GUID tables from a template file.

pub mod finder;
pub mod mapper;
pub mod unpack;
pub mod xml;

pub use finder::{template_files, AssetFinder, RelatedRef};
pub use mapper::{constant_name, write_mapping, MapperError, MappingEntry};
pub use unpack::{unpack, UnpackError, UnpackMode, UnpackOptions, UnpackReport};
