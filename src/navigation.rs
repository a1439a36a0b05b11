//! Navigation assembly.
//!
//! Walks a [`ContentNode`] tree and produces two things at once:
//!
//! - a [`Navigation`] tree of [`NavigationLink`]s (pages at level 1, in-page
//!   anchors at level 2 and deeper), and
//! - a [`ContentCache`]: one [`PageContext`] per document-bearing node, keyed
//!   by the output file route the page is written to.
//!
//! ## Routes
//!
//! With locales enabled every top-level directory is a locale root and gets
//! its own tree; otherwise the whole source folder is one tree rooted at `/`.
//! When versioning is enabled the version is appended to the root section.
//!
//! ```text
//! locales + versioning:   docs/en/02-guides/01-writing.md  →  /en/2.0.0/guides/writing.html
//!                         docs/en/index.md                 →  /en/2.0.0/index.html
//! single root, no version: docs/01-page.md                 →  /page.html
//!                         docs/index.md                    →  /index.html
//! ```
//!
//! Directories with an `index.md` map to `<route>/index.html`; everything else
//! maps to `<route>.html`. Link paths are the file routes composed with the
//! base URL.
//!
//! ## Anchor nesting
//!
//! A document's anchors arrive as a flat list of heading levels and are folded
//! into a tree with a stack of insertion lists:
//!
//! - same level as the previous anchor → sibling
//! - deeper → child of the previous anchor (one push, whatever the jump)
//! - shallower → pop exactly one frame (whatever the drop)
//!
//! `[2, 4, 2]` nests the 4 under the first 2 and returns the second 2 to the
//! top. `[2, 4, 6, 2]` leaves the final 2 under the first 2, since only one
//! frame is popped. Published navigation menus depend on this shape, so it is
//! kept as is.
//!
//! ## Concurrency
//!
//! Locale roots are assembled in parallel, each into its own cache fragment.
//! Fragments are folded in locale order once every locale is done.

use crate::content::ContentNode;
use crate::metadata::Metadata;
use crate::routes::{compose_url, file_route, join_route};
use crate::types::{ContentAnchor, NavigationLink};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Render context for one page, captured during assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageContext {
    pub title: String,
    /// Rendered document body.
    pub content: String,
    pub locale: String,
    /// `None` when versioning is disabled.
    pub version: Option<String>,
    pub template: Option<String>,
    pub metadata: Metadata,
    /// Links to the pages directly below this one (hidden pages excluded).
    pub child_links: Vec<NavigationLink>,
    /// Canonical URL of the page.
    pub url: String,
}

/// Output file route → page context.
pub type ContentCache = BTreeMap<String, PageContext>;

/// Navigation trees for the whole site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Navigation {
    /// Single-root mode: one tree for the whole site.
    Root(NavigationLink),
    /// Per-locale mode: one tree per locale code.
    Locales(BTreeMap<String, NavigationLink>),
}

impl Navigation {
    /// Navigation tree shown on pages of `locale`.
    pub fn for_locale(&self, locale: &str) -> Option<&NavigationLink> {
        match self {
            Navigation::Root(link) => Some(link),
            Navigation::Locales(locales) => locales.get(locale),
        }
    }

    /// Locale codes, empty in single-root mode.
    pub fn locales(&self) -> Vec<&str> {
        match self {
            Navigation::Root(_) => Vec::new(),
            Navigation::Locales(locales) => locales.keys().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Treat each top-level directory as a locale root.
    pub locales_enabled: bool,
    /// Version to publish, when versioning is enabled.
    pub version: Option<String>,
    /// Locale recorded for pages in single-root mode.
    pub default_locale: String,
    pub base_url: String,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            locales_enabled: false,
            version: None,
            default_locale: "en".to_string(),
            base_url: "/".to_string(),
        }
    }
}

/// Builds navigation trees and the content cache from a content tree.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    options: AssemblyOptions,
}

impl Assembler {
    pub fn new(options: AssemblyOptions) -> Self {
        Self { options }
    }

    /// Assemble navigation and the content cache. Running it twice on the
    /// same tree yields identical results.
    pub fn assemble(&self, root: &ContentNode) -> (Navigation, ContentCache) {
        if !self.options.locales_enabled {
            let mut cache = ContentCache::new();
            let link = self.assemble_root(root, "/", &self.options.default_locale, &mut cache);
            return (Navigation::Root(link), cache);
        }

        let fragments: Vec<(String, NavigationLink, ContentCache)> = root
            .children()
            .par_iter()
            .map(|locale_root| {
                let locale = locale_root.path_section.clone();
                let mut cache = ContentCache::new();
                let link =
                    self.assemble_root(locale_root, &locale_root.path_section, &locale, &mut cache);
                (locale, link, cache)
            })
            .collect();

        let mut cache = ContentCache::new();
        let mut locales = BTreeMap::new();
        for (locale, link, fragment) in fragments {
            for (path, page) in fragment {
                insert_page(&mut cache, path, page);
            }
            locales.insert(locale, link);
        }
        (Navigation::Locales(locales), cache)
    }

    fn assemble_root(
        &self,
        node: &ContentNode,
        section: &str,
        locale: &str,
        cache: &mut ContentCache,
    ) -> NavigationLink {
        let section = match &self.options.version {
            Some(version) => join_route(section, version),
            None => section.to_string(),
        };
        self.assemble_node(node, &section, "/", locale, cache)
    }

    fn assemble_node(
        &self,
        node: &ContentNode,
        section: &str,
        base_path: &str,
        locale: &str,
        cache: &mut ContentCache,
    ) -> NavigationLink {
        let this_path = join_route(base_path, section);
        let file_path = file_route(&this_path, node.is_index());
        let route = compose_url(&self.options.base_url, &file_path);

        let mut child_links = Vec::new();
        for child in node.children() {
            // Hidden pages are still assembled so they get rendered.
            let link = self.assemble_node(child, &child.path_section, &this_path, locale, cache);
            if !child.hidden() {
                child_links.push(link);
            }
        }

        if let Some(html) = node.html() {
            let page = PageContext {
                title: node.title.clone(),
                content: html.to_string(),
                locale: locale.to_string(),
                version: self.options.version.clone(),
                template: node.template().map(str::to_string),
                metadata: node.metadata().cloned().unwrap_or_default(),
                child_links: child_links.clone(),
                url: route.clone(),
            };
            insert_page(cache, file_path, page);
        }

        let mut children = nest_anchors(node.anchors(), &route);
        children.extend(child_links);

        NavigationLink {
            title: node.title.clone(),
            path: route,
            level: 1,
            children,
        }
    }
}

/// Two nodes resolving to the same route: the later one wins.
fn insert_page(cache: &mut ContentCache, path: String, page: PageContext) {
    let title = page.title.clone();
    if let Some(previous) = cache.insert(path.clone(), page) {
        tracing::warn!(
            path = %path,
            replaced = %previous.title,
            by = %title,
            "two pages resolve to the same output path"
        );
    }
}

/// Fold a flat anchor list into a tree (single-pop rule, see module docs).
pub fn nest_anchors(anchors: &[ContentAnchor], route: &str) -> Vec<NavigationLink> {
    let mut top = Vec::new();
    // Each entry is the index of the link whose children list is a stack frame.
    let mut stack: Vec<usize> = Vec::new();
    let mut current_level = anchors.first().map_or(2, |a| a.level);

    for anchor in anchors {
        let link = NavigationLink {
            title: anchor.name.clone(),
            path: format!("{route}#{}", anchor.id),
            level: anchor.level,
            children: Vec::new(),
        };

        if anchor.level > current_level {
            let list = frame(&mut top, &stack);
            if let Some(last) = list.len().checked_sub(1) {
                stack.push(last);
            }
        } else if anchor.level < current_level {
            // Already at the top list: nothing left to pop.
            stack.pop();
        }
        frame(&mut top, &stack).push(link);
        current_level = anchor.level;
    }
    top
}

fn frame<'a>(top: &'a mut Vec<NavigationLink>, stack: &[usize]) -> &'a mut Vec<NavigationLink> {
    stack
        .iter()
        .fold(top, |list, &index| &mut list[index].children)
}

/// Previous and next pages around `path` in menu order.
///
/// Pages are taken depth-first from the menu; anchors are skipped.
pub fn page_neighbours<'a>(
    menu: &'a NavigationLink,
    path: &str,
) -> (Option<&'a NavigationLink>, Option<&'a NavigationLink>) {
    let mut pages = Vec::new();
    collect_pages(menu, &mut pages);
    match pages.iter().position(|p| p.path == path) {
        Some(i) => (
            i.checked_sub(1).and_then(|p| pages.get(p)).copied(),
            pages.get(i + 1).copied(),
        ),
        None => (None, None),
    }
}

fn collect_pages<'a>(link: &'a NavigationLink, pages: &mut Vec<&'a NavigationLink>) {
    if link.is_anchor() {
        return;
    }
    pages.push(link);
    for child in &link.children {
        collect_pages(child, pages);
    }
}
