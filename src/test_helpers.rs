//! Shared test utilities for the markfold test suite.
//!
//! Provides fixture setup, lookup helpers, and navigation tree assertions
//! that work with assembly-phase data structures (`Navigation`,
//! `NavigationLink`, `ContentCache`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let docs = setup_fixtures();
//! let theme = setup_theme();
//!
//! let page = find_page(&cache, "/en/1.0.0/guides/writing.html");
//! assert_eq!(page.title, "Writing Pages");
//!
//! assert_nav_shape(nav.for_locale("en").unwrap(), &[
//!     ("Getting Started", &[]),
//!     ("Guides", &["Writing Pages"]),
//!     ("reference", &["Command Line"]),
//! ]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::navigation::{ContentCache, PageContext};
use crate::types::NavigationLink;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/docs/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    copy_to_temp("fixtures/docs")
}

/// Copy the bundled default theme (`theme/`) to a temp directory.
pub fn setup_theme() -> TempDir {
    copy_to_temp("theme")
}

fn copy_to_temp(rel: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join(rel);
    copy_dir_recursive(&source, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a cached page by route. Panics if not found.
pub fn find_page<'a>(cache: &'a ContentCache, route: &str) -> &'a PageContext {
    cache.get(route).unwrap_or_else(|| {
        let routes: Vec<&str> = cache.keys().map(String::as_str).collect();
        panic!("page '{route}' not found. Available: {routes:?}")
    })
}

/// Find a direct child link by title. Panics if not found.
pub fn find_link<'a>(parent: &'a NavigationLink, title: &str) -> &'a NavigationLink {
    parent
        .children
        .iter()
        .find(|l| l.title == title)
        .unwrap_or_else(|| {
            panic!(
                "link '{title}' not found under '{}'. Available: {:?}",
                parent.title,
                link_titles(&parent.children)
            )
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Titles of a list of links, anchors included.
pub fn link_titles(links: &[NavigationLink]) -> Vec<&str> {
    links.iter().map(|l| l.title.as_str()).collect()
}

/// Titles of every page in the tree, depth-first, anchors skipped.
pub fn page_titles(root: &NavigationLink) -> Vec<&str> {
    let mut titles = Vec::new();
    collect_page_titles(root, &mut titles);
    titles
}

fn collect_page_titles<'a>(link: &'a NavigationLink, titles: &mut Vec<&'a str>) {
    if link.is_anchor() {
        return;
    }
    titles.push(&link.title);
    for child in &link.children {
        collect_page_titles(child, titles);
    }
}

// =========================================================================
// Navigation assertions
// =========================================================================

/// Assert the page structure directly under `root`: each top-level page
/// title with the titles of the pages below it. Anchors are ignored.
pub fn assert_nav_shape(root: &NavigationLink, expected: &[(&str, &[&str])]) {
    let actual: Vec<(&str, Vec<&str>)> = root
        .children
        .iter()
        .filter(|l| !l.is_anchor())
        .map(|l| {
            let children = l
                .children
                .iter()
                .filter(|c| !c.is_anchor())
                .map(|c| c.title.as_str())
                .collect();
            (l.title.as_str(), children)
        })
        .collect();

    let expected: Vec<(&str, Vec<&str>)> = expected
        .iter()
        .map(|(title, children)| (*title, children.to_vec()))
        .collect();

    assert_eq!(actual, expected, "navigation shape mismatch");
}
