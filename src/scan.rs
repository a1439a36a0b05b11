//! Source tree scanning and file-system primitives.
//!
//! Walks the source folder and produces a [`FileNode`] tree of the Markdown
//! documents it contains. Nothing is read or converted here; the tree only
//! records names, paths and which directories carry an `index.md`.
//!
//! ## Directory Structure
//!
//! ```text
//! docs/                            # Source folder
//! ├── index.md                     # Root index (optional site landing page)
//! ├── site.toml                    # Site info (not a document)
//! ├── assets/images/               # Content images (no documents → dropped)
//! ├── en/                          # Locale root
//! │   ├── index.md                 # Locale landing page
//! │   ├── 01-getting-started.md    # Page "getting-started"
//! │   └── 02-guides/               # Section "guides"
//! │       ├── index.md
//! │       └── 01-writing.md
//! └── fr/
//!     └── ...
//! ```
//!
//! ## Rules
//!
//! - Only `.md` files are documents; everything else is ignored.
//! - `index.md` marks its directory as an index node and is not listed as a child.
//! - Entries starting with `.` are skipped.
//! - Entries are visited in file-name order, so `NNN-` prefixes control order.
//! - Names lose their `NNN-` prefix (and files their extension): see [`naming`].
//! - With [`ScanOptions::exclude_empty_directories`], a directory with neither
//!   documents nor an index is left out entirely.

use crate::naming;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Document file name that turns a directory into an index node.
pub const INDEX_FILE: &str = "index.md";
const DOCUMENT_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Source folder not found: {0}")]
    MissingRoot(PathBuf),
}

/// A node of the scanned source tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileNode {
    Directory {
        name: String,
        path: PathBuf,
        has_index: bool,
        children: Vec<FileNode>,
    },
    File {
        name: String,
        path: PathBuf,
    },
}

impl FileNode {
    /// Sanitized name, used as the node's path section.
    pub fn name(&self) -> &str {
        match self {
            FileNode::Directory { name, .. } | FileNode::File { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileNode::Directory { path, .. } | FileNode::File { path, .. } => path,
        }
    }

    pub fn children(&self) -> &[FileNode] {
        match self {
            FileNode::Directory { children, .. } => children,
            FileNode::File { .. } => &[],
        }
    }

    /// Path of the directory's `index.md`, if it has one.
    pub fn index_path(&self) -> Option<PathBuf> {
        match self {
            FileNode::Directory {
                path,
                has_index: true,
                ..
            } => Some(path.join(INDEX_FILE)),
            _ => None,
        }
    }

    fn is_empty_directory(&self) -> bool {
        matches!(
            self,
            FileNode::Directory {
                has_index: false,
                children,
                ..
            } if children.is_empty()
        )
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub exclude_empty_directories: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude_empty_directories: true,
        }
    }
}

/// Scan `root` into a [`FileNode::Directory`] tree.
///
/// The root itself is always returned, even when it holds no documents.
pub fn scan_tree(root: &Path, options: &ScanOptions) -> Result<FileNode, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }
    scan_directory(root, options)
}

fn scan_directory(path: &Path, options: &ScanOptions) -> Result<FileNode, ScanError> {
    let mut has_index = false;
    let mut children = Vec::new();

    let entries = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }

        if entry.file_type().is_dir() {
            let child = scan_directory(entry.path(), options)?;
            if options.exclude_empty_directories && child.is_empty_directory() {
                continue;
            }
            children.push(child);
        } else if is_document(entry.path()) {
            if file_name == INDEX_FILE {
                has_index = true;
                continue;
            }
            children.push(FileNode::File {
                name: naming::path_section(&file_name, true),
                path: entry.into_path(),
            });
        }
    }

    let dir_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileNode::Directory {
        name: naming::path_section(&dir_name, false),
        path: path.to_path_buf(),
        has_index,
        children,
    })
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        .unwrap_or(false)
}

// ============================================================================
// File-system primitives
// ============================================================================

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Names of the directories directly under `path`, sorted.
///
/// A missing directory lists as empty.
pub fn list_dir_names(path: &Path) -> io::Result<Vec<String>> {
    if !path.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Regular files directly under `path`, sorted by name. A missing directory
/// lists as empty.
pub fn list_files(path: &Path) -> io::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .map(|n| !n.to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
