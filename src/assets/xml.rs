//! Read-only access to asset XML documents.
//!
//! The game data uses a fixed shape:
//!
//! ```xml
//! <Assets>
//!   <Asset>
//!     <Template>Product</Template>
//!     <Values>
//!       <Standard><GUID>1010017</GUID><Name>Wood</Name></Standard>
//!       ...
//!     </Values>
//!   </Asset>
//! </Assets>
//! ```

use roxmltree::{Document, Node};

use crate::cache::AssetInfo;

/// Placeholder used when an asset has no name or template element.
pub const UNKNOWN: &str = "Unknown";

/// Parse an asset document.
pub fn parse(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    Document::parse(text)
}

/// First child element called `name`.
#[must_use]
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Follow a `/`-separated chain of child elements.
#[must_use]
pub fn child_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    path.split('/').try_fold(node, child)
}

/// Trimmed text content, `None` if empty.
#[must_use]
pub fn text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|t| !t.is_empty())
}

/// `Asset` elements directly under the document root.
pub fn top_level_assets<'a, 'input: 'a>(
    doc: &'a Document<'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Asset")
}

/// `Asset` elements anywhere in the document.
pub fn all_assets<'a, 'input: 'a>(
    doc: &'a Document<'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Asset")
}

#[must_use]
pub fn asset_guid<'a>(asset: Node<'a, '_>) -> Option<&'a str> {
    child_path(asset, "Values/Standard/GUID").and_then(text)
}

#[must_use]
pub fn asset_name<'a>(asset: Node<'a, '_>) -> Option<&'a str> {
    child_path(asset, "Values/Standard/Name").and_then(text)
}

#[must_use]
pub fn asset_template<'a>(asset: Node<'a, '_>) -> Option<&'a str> {
    child(asset, "Template").and_then(text)
}

/// Build the cached identity of an asset; `None` if it has no GUID.
#[must_use]
pub fn asset_info(asset: Node<'_, '_>, file_name: &str) -> Option<AssetInfo> {
    let guid = asset_guid(asset)?;
    Some(AssetInfo {
        guid: guid.to_string(),
        name: asset_name(asset).unwrap_or(UNKNOWN).to_string(),
        template: asset_template(asset).unwrap_or(UNKNOWN).to_string(),
        file: file_name.to_string(),
    })
}

/// Original source text of an element, byte for byte.
#[must_use]
pub fn source_text<'input>(text: &'input str, node: Node<'_, 'input>) -> &'input str {
    &text[node.range()]
}
