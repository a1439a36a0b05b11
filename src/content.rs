//! Content tree building.
//!
//! Converts a scanned [`FileNode`] tree into a [`ContentNode`] tree: every
//! document is read and run through the [`Converter`], and every directory
//! adopts its `index.md` when it has one.
//!
//! ```text
//! FileNode::Directory "guides" (has_index)     ContentNode "Guides"  (Directory, index: Some)
//! ├── FileNode::File "writing"          →       ├── ContentNode "Writing"  (Document)
//! └── FileNode::Directory "drafts"              └── ContentNode "drafts"   (Directory, index: None)
//! ```
//!
//! Siblings are converted in parallel on the rayon pool. Results are
//! collected positionally, so child order always matches scan order.

use crate::convert::{ConvertedDocument, Converter};
use crate::metadata::Metadata;
use crate::scan::FileNode;
use crate::types::ContentAnchor;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read document {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A converted document: a standalone page or a directory's index.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub html: String,
    pub anchors: Vec<ContentAnchor>,
    pub template: Option<String>,
    pub hidden: bool,
    pub metadata: Metadata,
}

impl From<ConvertedDocument> for Document {
    fn from(doc: ConvertedDocument) -> Self {
        Self {
            html: doc.html,
            anchors: doc.anchors,
            template: doc.template,
            hidden: doc.hidden,
            metadata: doc.metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentKind {
    Document(Document),
    Directory {
        index: Option<Document>,
        children: Vec<ContentNode>,
    },
}

/// One node of the content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub title: String,
    /// URL segment for this node (ordering prefix and extension removed).
    pub path_section: String,
    pub kind: ContentKind,
}

impl ContentNode {
    fn document(&self) -> Option<&Document> {
        match &self.kind {
            ContentKind::Document(doc) => Some(doc),
            ContentKind::Directory { index, .. } => index.as_ref(),
        }
    }

    /// Rendered body. `Some` only for nodes backed by an actual document.
    pub fn html(&self) -> Option<&str> {
        self.document().map(|d| d.html.as_str())
    }

    pub fn anchors(&self) -> &[ContentAnchor] {
        self.document()
            .map(|d| d.anchors.as_slice())
            .unwrap_or(&[])
    }

    pub fn children(&self) -> &[ContentNode] {
        match &self.kind {
            ContentKind::Directory { children, .. } => children,
            ContentKind::Document(_) => &[],
        }
    }

    /// A directory whose `index.md` exists.
    pub fn is_index(&self) -> bool {
        matches!(&self.kind, ContentKind::Directory { index: Some(_), .. })
    }

    pub fn template(&self) -> Option<&str> {
        self.document().and_then(|d| d.template.as_deref())
    }

    /// Left out of navigation menus (still rendered).
    pub fn hidden(&self) -> bool {
        self.document().is_some_and(|d| d.hidden)
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.document().map(|d| &d.metadata)
    }

    /// Total number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(ContentNode::node_count).sum::<usize>()
    }
}

/// Build the content tree for a scanned source tree.
///
/// The first unreadable document aborts the whole build.
pub fn build_content_tree(
    node: &FileNode,
    converter: &Converter,
) -> Result<ContentNode, ContentError> {
    match node {
        FileNode::File { name, path } => {
            let converted = convert_file(path, converter)?;
            tracing::debug!(path = %path.display(), "converted document");
            Ok(ContentNode {
                title: converted.title.clone().unwrap_or_else(|| name.clone()),
                path_section: name.clone(),
                kind: ContentKind::Document(converted.into()),
            })
        }
        FileNode::Directory { name, children, .. } => {
            let index = node
                .index_path()
                .map(|path| convert_file(&path, converter))
                .transpose()?;

            let children = children
                .par_iter()
                .map(|child| build_content_tree(child, converter))
                .collect::<Result<Vec<_>, _>>()?;

            let title = index
                .as_ref()
                .and_then(|doc| doc.title.clone())
                .unwrap_or_else(|| name.clone());

            Ok(ContentNode {
                title,
                path_section: name.clone(),
                kind: ContentKind::Directory {
                    index: index.map(Document::from),
                    children,
                },
            })
        }
    }
}

fn convert_file(path: &Path, converter: &Converter) -> Result<ConvertedDocument, ContentError> {
    let text = fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(converter.convert(&text))
}
