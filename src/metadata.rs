//! Per-document metadata carried in a leading HTML comment.
//!
//! A document may open with a comment block of `key: value` lines. The block
//! is stripped before Markdown rendering and its values travel with the page:
//!
//! ```text
//! <!--
//! page_title: Getting Started
//! template: landing
//! nav_max: 2
//! hidden
//! - lines starting with a dash are comments
//! -->
//! # Welcome
//! ```
//!
//! ## Value types
//!
//! - `true` / `false` → boolean
//! - anything that parses as a finite number → number
//! - a bare key with no value → boolean `true`
//! - everything else → trimmed string
//!
//! ## Reserved keys
//!
//! A handful of keys steer the build instead of just decorating the page.
//! They are read by [`crate::convert`]:
//!
//! | Key | Effect |
//! |-----|--------|
//! | `page_title` | overrides the title taken from the first H1 |
//! | `template` | selects the theme template (removed from the map) |
//! | `nav_max` | deepest heading level listed as an anchor (default 3) |
//! | `hidden` | keeps the page out of navigation menus |
//!
//! A block that is not at the very start of the text, is unterminated, or
//! contains a `<` is not metadata. The text is then rendered unchanged.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved key: title override.
pub const PAGE_TITLE: &str = "page_title";
/// Reserved key: template override.
pub const TEMPLATE: &str = "template";
/// Reserved key: maximum anchor depth.
pub const NAV_MAX: &str = "nav_max";
/// Reserved key: hide from navigation.
pub const HIDDEN: &str = "hidden";

/// Document metadata, ordered by key.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl MetadataValue {
    /// Parse a trimmed raw value.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "" | "true" => MetadataValue::Bool(true),
            "false" => MetadataValue::Bool(false),
            _ => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => MetadataValue::Number(n),
                _ => MetadataValue::Text(raw.to_string()),
            },
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Truthiness as templates see it: `false`, `0` and `""` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            MetadataValue::Bool(b) => *b,
            MetadataValue::Number(n) => *n != 0.0,
            MetadataValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Number(n) => write!(f, "{n}"),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

// Whole numbers serialize as integers so `nav_max: 2` renders as `2`, not `2.0`.
impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataValue::Bool(b) => serializer.serialize_bool(*b),
            MetadataValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                serializer.serialize_i64(*n as i64)
            }
            MetadataValue::Number(n) => serializer.serialize_f64(*n),
            MetadataValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// A metadata block found at the start of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataBlock<'a> {
    pub values: Metadata,
    /// Exact prefix of the document occupied by the block, trailing newline included.
    pub raw: &'a str,
}

impl MetadataBlock<'_> {
    /// The document text following the block.
    pub fn strip<'t>(&self, text: &'t str) -> &'t str {
        text.strip_prefix(self.raw).unwrap_or(text)
    }
}

const OPEN: &str = "<!--";
const CLOSE: &str = "-->";

/// Extract the leading metadata block, if the document has one.
pub fn extract_metadata(text: &str) -> Option<MetadataBlock<'_>> {
    let body = text.strip_prefix(OPEN)?;
    let close = body.find(CLOSE)?;
    let interior = &body[..close];
    if interior.is_empty() || interior.contains('<') {
        return None;
    }

    let after = &body[close + CLOSE.len()..];
    let newline = if after.starts_with("\r\n") {
        2
    } else if after.starts_with('\n') {
        1
    } else {
        return None;
    };
    let raw_len = OPEN.len() + close + CLOSE.len() + newline;

    // The opener line carries no entries.
    let values = interior
        .lines()
        .skip(1)
        .filter_map(parse_line)
        .collect();

    Some(MetadataBlock {
        values,
        raw: &text[..raw_len],
    })
}

fn parse_line(line: &str) -> Option<(String, MetadataValue)> {
    let (key, value) = match line.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (line.trim(), ""),
    };
    if key.is_empty() || key.starts_with('-') {
        return None;
    }
    Some((key.to_string(), MetadataValue::parse(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(text: &str) -> Metadata {
        extract_metadata(text).expect("metadata block").values
    }

    #[test]
    fn parses_typed_values() {
        let meta = values("<!--\ntitle: Hello\ncount: 3\nratio: 0.5\nflag: false\n-->\n# Body");
        assert_eq!(meta["title"], MetadataValue::Text("Hello".into()));
        assert_eq!(meta["count"], MetadataValue::Number(3.0));
        assert_eq!(meta["ratio"], MetadataValue::Number(0.5));
        assert_eq!(meta["flag"], MetadataValue::Bool(false));
    }

    #[test]
    fn bare_key_is_true() {
        let meta = values("<!--\nhidden\nempty:\n-->\n");
        assert_eq!(meta["hidden"], MetadataValue::Bool(true));
        assert_eq!(meta["empty"], MetadataValue::Bool(true));
    }

    #[test]
    fn dash_lines_are_comments() {
        let meta = values("<!--\n- a note for editors\nkey: value\n-->\n");
        assert_eq!(meta.len(), 1);
        assert_eq!(meta["key"], MetadataValue::Text("value".into()));
    }

    #[test]
    fn value_keeps_text_after_first_colon() {
        let meta = values("<!--\nsource: https://example.com/a\n-->\n");
        assert_eq!(
            meta["source"],
            MetadataValue::Text("https://example.com/a".into())
        );
    }

    #[test]
    fn raw_is_exact_prefix() {
        let text = "<!--\npage_title: Banana\n-->\n# Apple\n";
        let block = extract_metadata(text).unwrap();
        assert_eq!(block.raw, "<!--\npage_title: Banana\n-->\n");
        assert_eq!(block.strip(text), "# Apple\n");
    }

    #[test]
    fn opener_line_is_ignored() {
        let meta = values("<!-- page settings\nkey: 1\n-->\n");
        assert_eq!(meta.len(), 1);
        assert!(meta.contains_key("key"));
    }

    // =========================================================================
    // Not metadata
    // =========================================================================

    #[test]
    fn comment_not_at_start_is_ignored() {
        assert!(extract_metadata("# Title\n<!--\nkey: value\n-->\n").is_none());
        assert!(extract_metadata(" <!--\nkey: value\n-->\n").is_none());
    }

    #[test]
    fn unterminated_comment_is_ignored() {
        assert!(extract_metadata("<!--\nkey: value\n# Title\n").is_none());
    }

    #[test]
    fn terminator_must_end_the_line() {
        assert!(extract_metadata("<!--\nkey: value\n--> trailing\n").is_none());
        assert!(extract_metadata("<!--\nkey: value\n-->").is_none());
    }

    #[test]
    fn only_the_first_terminator_counts() {
        // A later `-->` on its own line does not rescue the block.
        let text = "<!--\na: x-->y\nb: 1\n-->\n# Body";
        assert!(extract_metadata(text).is_none());
    }

    #[test]
    fn angle_bracket_inside_block_is_rejected() {
        assert!(extract_metadata("<!--\nkey: <b>\n-->\n").is_none());
    }

    // =========================================================================
    // Value helpers
    // =========================================================================

    #[test]
    fn truthiness() {
        assert!(MetadataValue::Bool(true).is_truthy());
        assert!(!MetadataValue::Number(0.0).is_truthy());
        assert!(!MetadataValue::Text(String::new()).is_truthy());
        assert!(MetadataValue::Text("yes".into()).is_truthy());
    }

    #[test]
    fn non_finite_numbers_stay_text() {
        assert_eq!(MetadataValue::parse("inf"), MetadataValue::Text("inf".into()));
        assert_eq!(MetadataValue::parse("NaN"), MetadataValue::Text("NaN".into()));
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        let json = serde_json::to_string(&MetadataValue::Number(2.0)).unwrap();
        assert_eq!(json, "2");
        let json = serde_json::to_string(&MetadataValue::Number(2.5)).unwrap();
        assert_eq!(json, "2.5");
    }
}
