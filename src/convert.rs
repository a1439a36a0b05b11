//! Markdown document conversion.
//!
//! Turns the text of one source document into rendered HTML plus the pieces
//! the rest of the build needs: a title, the heading anchors listed in
//! navigation menus, and the reserved metadata overrides.
//!
//! ## Rendering
//!
//! Markdown is parsed with pulldown-cmark into an event list, which is then
//! rewritten in two passes before being handed to the HTML writer:
//!
//! 1. **Heading ids**: every heading gets a GitHub-style slug of its text,
//!    prefixed with the anchor prefix and made unique within the document
//!    (`intro`, `intro-1`, `intro-2`).
//! 2. **References**: relative links and images are rewritten to their
//!    published locations.
//!
//! ```text
//! [next](../01-page.md#section)   →  <a href="../page.html#mf-section">
//! ![d](../../assets/images/d.png) →  <img src="/assets/content/images/d.3f9a0c21be.png" alt="d">
//! ![d](./d.png?center)            →  <img src="/./d.png" alt="d" class="img-center">
//! ```
//!
//! Only references starting with `.` are touched. Absolute paths and
//! external URLs render as written.
//!
//! ## Titles and anchors
//!
//! The title is the `page_title` metadata value when present, else the text
//! of the first level-1 heading, else `None` (callers supply a fallback).
//! Anchors are the level-2 and deeper headings, down to `nav_max` (default 3).

use crate::metadata::{self, HIDDEN, Metadata, MetadataValue, NAV_MAX, PAGE_TITLE, TEMPLATE};
use crate::naming;
use crate::routes;
use crate::types::ContentAnchor;
use maud::html;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html};
use std::collections::{BTreeMap, HashMap};

/// Deepest heading level listed as an anchor unless `nav_max` says otherwise.
pub const DEFAULT_MAX_ANCHOR_DEPTH: u8 = 3;

/// Settings shared by every document in a build.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Prepended to every heading id and to rewritten link fragments.
    pub anchor_prefix: String,
    pub base_url: String,
    /// Content image file name → published (hashed) URL.
    pub content_images: BTreeMap<String, String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            anchor_prefix: "mf-".to_string(),
            base_url: "/".to_string(),
            content_images: BTreeMap::new(),
        }
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedDocument {
    pub title: Option<String>,
    pub html: String,
    pub anchors: Vec<ContentAnchor>,
    pub template: Option<String>,
    pub hidden: bool,
    pub metadata: Metadata,
}

/// A heading found while rendering.
#[derive(Debug, Clone, PartialEq)]
struct Heading {
    level: u8,
    id: String,
    text: String,
}

/// Converts Markdown documents with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Convert document text. Never fails: a malformed metadata block is
    /// simply rendered as an HTML comment.
    pub fn convert(&self, text: &str) -> ConvertedDocument {
        let (body, mut metadata) = match metadata::extract_metadata(text) {
            Some(block) => (block.strip(text), block.values),
            None => (text, Metadata::new()),
        };

        let template = metadata.remove(TEMPLATE).map(|v| v.to_string());
        let max_depth = metadata
            .get(NAV_MAX)
            .and_then(MetadataValue::as_number)
            .map_or(DEFAULT_MAX_ANCHOR_DEPTH, |n| n.clamp(0.0, 6.0) as u8);
        let hidden = metadata.get(HIDDEN).is_some_and(MetadataValue::is_truthy);

        let (html, headings) = self.render(body);

        let title = metadata
            .get(PAGE_TITLE)
            .map(ToString::to_string)
            .or_else(|| {
                headings
                    .iter()
                    .find(|h| h.level == 1)
                    .map(|h| h.text.clone())
            });

        let anchors = headings
            .into_iter()
            .filter(|h| h.level >= 2 && h.level <= max_depth)
            .map(|h| ContentAnchor {
                id: h.id,
                name: h.text,
                level: h.level,
            })
            .collect();

        ConvertedDocument {
            title,
            html,
            anchors,
            template,
            hidden,
            metadata,
        }
    }

    fn render(&self, markdown: &str) -> (String, Vec<Heading>) {
        let mut events: Vec<Event> = Parser::new_ext(markdown, markdown_options()).collect();
        let headings = assign_heading_ids(&mut events, &self.options.anchor_prefix);
        let events = self.rewrite_references(events);

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        md_html::push_html(&mut html, events.into_iter());
        (html, headings)
    }

    fn rewrite_references<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut iter = events.into_iter();
        while let Some(event) = iter.next() {
            match event {
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) if is_relative(&dest_url) => {
                    let href = rewrite_link(&dest_url, &self.options.anchor_prefix);
                    out.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url: href.into(),
                        title,
                        id,
                    }));
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) if is_relative(&dest_url) => {
                    let alt = take_alt_text(&mut iter);
                    out.push(Event::InlineHtml(
                        self.image_tag(&dest_url, &alt, &title).into(),
                    ));
                }
                other => out.push(other),
            }
        }
        out
    }

    fn image_tag(&self, src: &str, alt: &str, title: &str) -> String {
        let (src, centered) = match src.split_once('?') {
            Some((path, "center")) => (path, true),
            _ => (src, false),
        };
        let path = collapse_parent_segments(src);
        let url = self
            .content_image_url(&path)
            .unwrap_or_else(|| routes::compose_url(&self.options.base_url, &path));
        let title = (!title.is_empty()).then_some(title);

        html! {
            img src=(url) alt=(alt) title=[title] class=[centered.then_some("img-center")];
        }
        .into_string()
    }

    fn content_image_url(&self, path: &str) -> Option<String> {
        let (dir, file_name) = path.rsplit_once('/')?;
        if !dir.starts_with("/assets/images") {
            return None;
        }
        self.options.content_images.get(file_name).cloned()
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

fn is_relative(url: &str) -> bool {
    url.starts_with('.')
}

/// Rewrite a relative link to its published form.
///
/// Ordering prefixes are stripped from every segment, `.md` becomes `.html`
/// and a fragment on a page link gets the anchor prefix.
pub fn rewrite_link(href: &str, anchor_prefix: &str) -> String {
    let stripped = naming::strip_link_prefixes(href);
    let (path, fragment) = match stripped.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (stripped.as_str(), None),
    };
    let path = match path.strip_suffix(".md") {
        Some(stem) => format!("{stem}.html"),
        None => path.to_string(),
    };
    match fragment {
        Some(fragment) if path.ends_with(".html") => format!("{path}#{anchor_prefix}{fragment}"),
        Some(fragment) => format!("{path}#{fragment}"),
        None => path,
    }
}

/// Replace every run of `../` with a single `/`.
fn collapse_parent_segments(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while !rest.is_empty() {
        if rest.starts_with("../") {
            while let Some(next) = rest.strip_prefix("../") {
                rest = next;
            }
            out.push('/');
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

/// Consume events up to the matching image end, returning the alt text.
fn take_alt_text<'a>(iter: &mut impl Iterator<Item = Event<'a>>) -> String {
    let mut alt = String::new();
    let mut depth = 0usize;
    for event in iter {
        match event {
            Event::Start(Tag::Image { .. }) => depth += 1,
            Event::End(TagEnd::Image) if depth == 0 => break,
            Event::End(TagEnd::Image) => depth -= 1,
            Event::Text(text) | Event::Code(text) => alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => {}
        }
    }
    alt
}

// ============================================================================
// Heading ids
// ============================================================================

fn assign_heading_ids(events: &mut [Event], prefix: &str) -> Vec<Heading> {
    let mut slugger = Slugger::default();
    let mut headings = Vec::new();

    for i in 0..events.len() {
        let level = match &events[i] {
            Event::Start(Tag::Heading { level, .. }) => heading_level(*level),
            _ => continue,
        };
        let text = heading_text(&events[i + 1..]);
        let id = format!("{prefix}{}", slugger.slug(&text));
        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
            *slot = Some(id.clone().into());
        }
        headings.push(Heading { level, id, text });
    }
    headings
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// GitHub-style slug generator, unique per document.
///
/// Every issued slug is recorded with the last suffix tried for it, so a
/// heading whose text looks like an earlier suffix (`A`, `A`, `A-1`) still
/// gets a fresh id (`a`, `a-1`, `a-1-1`).
#[derive(Debug, Default)]
struct Slugger {
    issued: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        while self.issued.contains_key(&slug) {
            let count = self.issued.entry(base.clone()).or_default();
            *count += 1;
            slug = format!("{base}-{count}");
        }
        self.issued.insert(slug.clone(), 0);
        slug
    }
}

/// Lowercase, spaces become dashes, punctuation other than `-` and `_` is dropped.
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(text: &str) -> ConvertedDocument {
        Converter::default().convert(text)
    }

    fn anchor_levels(doc: &ConvertedDocument) -> Vec<u8> {
        doc.anchors.iter().map(|a| a.level).collect()
    }

    // =========================================================================
    // Titles
    // =========================================================================

    #[test]
    fn title_from_first_h1() {
        let doc = convert("# Some File\n\nwith content\n");
        assert_eq!(doc.title.as_deref(), Some("Some File"));
        assert!(doc.html.contains(r#"<h1 id="mf-some-file">Some File</h1>"#));
        assert!(doc.html.contains("<p>with content</p>"));
    }

    #[test]
    fn only_first_h1_counts() {
        let doc = convert("# First\n\n# Second\n");
        assert_eq!(doc.title.as_deref(), Some("First"));
    }

    #[test]
    fn metadata_title_wins_over_h1() {
        let doc = convert("<!--\npage_title: Banana\n-->\n# Apple\n");
        assert_eq!(doc.title.as_deref(), Some("Banana"));
        assert_eq!(
            doc.metadata.get(PAGE_TITLE),
            Some(&MetadataValue::Text("Banana".into()))
        );
        assert!(!doc.html.contains("<!--"));
    }

    #[test]
    fn no_headings_no_title() {
        let doc = convert("just a paragraph\n");
        assert_eq!(doc.title, None);
        assert!(doc.anchors.is_empty());
    }

    // =========================================================================
    // Anchors
    // =========================================================================

    #[test]
    fn anchors_default_to_depth_three() {
        let doc = convert("# T\n## Two\n### Three\n#### Four\n## Again\n");
        assert_eq!(anchor_levels(&doc), vec![2, 3, 2]);
        assert_eq!(doc.anchors[0].id, "mf-two");
        assert_eq!(doc.anchors[0].name, "Two");
        // Deeper headings still render with ids.
        assert!(doc.html.contains(r#"<h4 id="mf-four">Four</h4>"#));
    }

    #[test]
    fn nav_max_overrides_depth() {
        let doc = convert("<!--\nnav_max: 4\n-->\n## Two\n### Three\n#### Four\n");
        assert_eq!(anchor_levels(&doc), vec![2, 3, 4]);

        let doc = convert("<!--\nnav_max: 0\n-->\n## Two\n");
        assert!(doc.anchors.is_empty());
    }

    #[test]
    fn non_numeric_nav_max_is_ignored() {
        let doc = convert("<!--\nnav_max: deep\n-->\n## Two\n### Three\n#### Four\n");
        assert_eq!(anchor_levels(&doc), vec![2, 3]);
    }

    #[test]
    fn duplicate_headings_get_suffixes() {
        let doc = convert("## Setup\n## Setup\n## Setup\n");
        let ids: Vec<&str> = doc.anchors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["mf-setup", "mf-setup-1", "mf-setup-2"]);
    }

    #[test]
    fn heading_matching_an_earlier_suffix_stays_unique() {
        let doc = convert("## A\n## A\n## A-1\n");
        let ids: Vec<&str> = doc.anchors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["mf-a", "mf-a-1", "mf-a-1-1"]);
        assert!(doc.html.contains(r#"<h2 id="mf-a-1-1">A-1</h2>"#));
    }

    #[test]
    fn heading_with_inline_code() {
        let doc = convert("## The `build` command\n");
        assert_eq!(doc.anchors[0].name, "The build command");
        assert_eq!(doc.anchors[0].id, "mf-the-build-command");
    }

    #[test]
    fn custom_anchor_prefix() {
        let converter = Converter::new(ConvertOptions {
            anchor_prefix: "sp-".into(),
            ..ConvertOptions::default()
        });
        let doc = converter.convert("## A secondary title\n");
        assert_eq!(doc.anchors[0].id, "sp-a-secondary-title");
    }

    // =========================================================================
    // Reserved metadata
    // =========================================================================

    #[test]
    fn template_is_lifted_out_of_metadata() {
        let doc = convert("<!--\ntemplate: landing\nauthor: Ada\n-->\n# Home\n");
        assert_eq!(doc.template.as_deref(), Some("landing"));
        assert!(!doc.metadata.contains_key(TEMPLATE));
        assert!(doc.metadata.contains_key("author"));
    }

    #[test]
    fn hidden_flag() {
        assert!(convert("<!--\nhidden\n-->\n# Draft\n").hidden);
        assert!(!convert("<!--\nhidden: false\n-->\n# Draft\n").hidden);
        assert!(!convert("# Public\n").hidden);
    }

    #[test]
    fn malformed_metadata_renders_as_content() {
        let doc = convert("<!--\npage_title: <b>Nope</b>\n-->\n# Title\n");
        assert_eq!(doc.title.as_deref(), Some("Title"));
        assert!(doc.metadata.is_empty());
        assert!(doc.html.contains("<!--"));
    }

    // =========================================================================
    // Links
    // =========================================================================

    #[test]
    fn rewrite_link_examples() {
        assert_eq!(rewrite_link("../01-page.md", "mf-"), "../page.html");
        assert_eq!(
            rewrite_link("../01-page.md#section", "mf-"),
            "../page.html#mf-section"
        );
        assert_eq!(
            rewrite_link("./02-guides/01-writing.md", "mf-"),
            "./guides/writing.html"
        );
    }

    #[test]
    fn rewrite_link_non_page_fragment_untouched() {
        assert_eq!(rewrite_link("./data.json#x", "mf-"), "./data.json#x");
    }

    #[test]
    fn relative_links_are_rewritten_in_html() {
        let doc = convert("See [the page](../01-page.md#further-down).\n");
        assert!(
            doc.html
                .contains(r#"<a href="../page.html#mf-further-down">the page</a>"#)
        );
    }

    #[test]
    fn absolute_and_external_links_untouched() {
        let doc = convert("[a](https://example.com/01-x.md) [b](/01-y.md)\n");
        assert!(doc.html.contains(r#"href="https://example.com/01-x.md""#));
        assert!(doc.html.contains(r#"href="/01-y.md""#));
    }

    // =========================================================================
    // Images
    // =========================================================================

    #[test]
    fn content_image_uses_hashed_url() {
        let mut options = ConvertOptions::default();
        options.content_images.insert(
            "diagram.png".into(),
            "/assets/content/images/diagram.0123456789.png".into(),
        );
        let doc = Converter::new(options).convert("![A diagram](../../assets/images/diagram.png)\n");
        assert!(doc.html.contains(
            r#"<img src="/assets/content/images/diagram.0123456789.png" alt="A diagram">"#
        ));
    }

    #[test]
    fn centered_image_gets_class() {
        let mut options = ConvertOptions::default();
        options
            .content_images
            .insert("diagram.png".into(), "/assets/content/images/diagram.aa.png".into());
        let doc = Converter::new(options).convert("![d](../assets/images/diagram.png?center)\n");
        assert!(doc.html.contains(
            r#"<img src="/assets/content/images/diagram.aa.png" alt="d" class="img-center">"#
        ));
    }

    #[test]
    fn unknown_relative_image_is_composed_with_base_url() {
        let converter = Converter::new(ConvertOptions {
            base_url: "/docs".into(),
            ..ConvertOptions::default()
        });
        let doc = converter.convert("![x](../../static/x.png)\n");
        assert!(doc.html.contains(r#"<img src="/docs/static/x.png" alt="x">"#));
    }

    #[test]
    fn absolute_image_untouched() {
        let doc = convert("![x](https://example.com/x.png)\n");
        assert!(doc.html.contains(r#"src="https://example.com/x.png""#));
    }

    #[test]
    fn image_alt_is_escaped() {
        let doc = convert("![a \"quoted\" alt](./x.png)\n");
        assert!(doc.html.contains(r#"alt="a &quot;quoted&quot; alt""#));
    }

    // =========================================================================
    // Slugs
    // =========================================================================

    #[test]
    fn slugify_github_style() {
        assert_eq!(slugify("A secondary title"), "a-secondary-title");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("snake_case & kebab-case"), "snake_case--kebab-case");
        assert_eq!(slugify("Démarrer"), "démarrer");
    }

    #[test]
    fn collapse_parent_segments_runs() {
        assert_eq!(collapse_parent_segments("../../assets/a.png"), "/assets/a.png");
        assert_eq!(collapse_parent_segments("./a.png"), "./a.png");
    }

    #[test]
    fn conversion_is_deterministic() {
        let text = "# T\n## A\n## A\n[x](./01-y.md#A)\n";
        assert_eq!(convert(text), convert(text));
    }
}
