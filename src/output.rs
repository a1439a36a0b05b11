//! CLI output formatting for `check` and `build`.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every page is shown
//! by its positional index and title; routes and details follow as secondary
//! context. The output reads as a table of contents of the site while still
//! letting users trace each page to the file it was written to.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Content
//! 001 en (3 pages)
//!     001 Getting Started
//!         Anchors: 2
//!     002 Guides (2 pages)
//!         001 Writing
//!         002 Drafts (hidden)
//!     003 reference (no index, 1 page)
//!         001 CLI
//!             Template: reference
//! ```
//!
//! ## Build
//!
//! ```text
//! en
//! 001 Home → /en/1.0.0/index.html
//!     001 Getting Started → /en/1.0.0/getting-started.html
//!     002 Guides → /en/1.0.0/guides/index.html
//!         001 Writing → /en/1.0.0/guides/writing.html
//!
//! Assets
//!     main.css → /assets/styles/main.3f9a0c21be.css
//!
//! Versions: 1.0.0, 2.0.0
//! Generated 9 pages (2 locales) → public
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::assets::SiteAssets;
use crate::content::ContentNode;
use crate::navigation::Navigation;
use crate::pipeline::BuildReport;
use crate::types::NavigationLink;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn count_label(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Format an entity header: positional index + title, with optional details.
///
/// ```text
/// 001 Guides (2 pages)
/// 002 Drafts (hidden)
/// 003 Writing
/// ```
fn entity_header(index: usize, title: &str, details: &[String]) -> String {
    if details.is_empty() {
        format!("{} {}", format_index(index), title)
    } else {
        format!("{} {} ({})", format_index(index), title, details.join(", "))
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the converted content tree.
///
/// The root itself is not listed; its children are the top-level entries
/// (locales, or sections in single-root sites).
pub fn format_check_output(root: &ContentNode) -> Vec<String> {
    let mut lines = vec!["Content".to_string()];
    if root.is_index() {
        lines.push(format!("{}Index: {}", indent(1), root.title));
    }
    for (i, child) in root.children().iter().enumerate() {
        format_content_node(child, i + 1, 0, &mut lines);
    }
    lines.push(String::new());
    lines.push(format!(
        "{} checked",
        count_label(root.node_count() - 1, "entry", "entries")
    ));
    lines
}

fn format_content_node(node: &ContentNode, position: usize, depth: usize, lines: &mut Vec<String>) {
    let mut details = Vec::new();
    let is_directory = !node.children().is_empty() || node.html().is_none();
    if is_directory && !node.is_index() {
        details.push("no index".to_string());
    }
    if is_directory {
        details.push(count_label(node.children().len(), "page", "pages"));
    }
    if node.hidden() {
        details.push("hidden".to_string());
    }
    lines.push(format!(
        "{}{}",
        indent(depth),
        entity_header(position, &node.title, &details)
    ));

    let context = indent(depth + 1);
    if !node.anchors().is_empty() {
        lines.push(format!("{context}Anchors: {}", node.anchors().len()));
    }
    if let Some(template) = node.template() {
        lines.push(format!("{context}Template: {template}"));
    }
    for (i, child) in node.children().iter().enumerate() {
        format_content_node(child, i + 1, depth + 1, lines);
    }
}

/// Print check output to stdout.
pub fn print_check_output(root: &ContentNode) {
    for line in format_check_output(root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the result of a build: page tree per locale, assets, versions.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    match &report.navigation {
        Navigation::Root(root) => format_page_tree(root, 1, 0, &mut lines),
        Navigation::Locales(locales) => {
            for (i, (locale, root)) in locales.iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                lines.push(locale.clone());
                format_page_tree(root, 1, 0, &mut lines);
            }
        }
    }

    if let Some(index) = &report.site_index {
        lines.push(String::new());
        lines.push(format!("Site index \u{2192} {}", index.display()));
    }

    lines.extend(format_assets(&report.assets));

    lines.push(String::new());
    if !report.versions.is_empty() {
        lines.push(format!("Versions: {}", report.versions.join(", ")));
    }
    let locale_count = report.navigation.locales().len();
    let locales = if locale_count == 0 {
        String::new()
    } else {
        format!(" ({})", count_label(locale_count, "locale", "locales"))
    };
    lines.push(format!(
        "Generated {}{} \u{2192} {}",
        count_label(report.pages.len(), "page", "pages"),
        locales,
        report.output.display()
    ));

    lines
}

/// Pages only: anchors are left out of the listing.
fn format_page_tree(link: &NavigationLink, position: usize, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}{} \u{2192} {}",
        indent(depth),
        entity_header(position, &link.title, &[]),
        link.path
    ));
    let pages = link.children.iter().filter(|c| !c.is_anchor());
    for (i, child) in pages.enumerate() {
        format_page_tree(child, i + 1, depth + 1, lines);
    }
}

fn format_assets(assets: &SiteAssets) -> Vec<String> {
    if assets.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Assets".to_string()];
    for group in [&assets.styles, &assets.scripts, &assets.images] {
        for (name, url) in group {
            lines.push(format!("{}{} \u{2192} {}", indent(1), name, url));
        }
    }
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
