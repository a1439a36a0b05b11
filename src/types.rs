//! Shared types used across the conversion, assembly and render stages.
//!
//! Both types are handed to theme templates as-is, so their serialized field
//! names are part of the template contract.

use serde::Serialize;

/// A heading inside a document that navigation menus can point at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentAnchor {
    /// Element id, unique within the document and carrying the anchor prefix.
    pub id: String,
    /// Heading text.
    pub name: String,
    /// Heading level, always 2 or deeper.
    pub level: u8,
}

/// Navigation tree item: a page (level 1) or an in-page anchor (level ≥ 2).
///
/// A page's own anchors come first among its children, followed by the
/// pages nested under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationLink {
    pub title: String,
    /// Final route, `#fragment` included for anchors.
    pub path: String,
    pub level: u8,
    pub children: Vec<NavigationLink>,
}

impl NavigationLink {
    pub fn is_anchor(&self) -> bool {
        self.level > 1
    }
}
