//! Centralized name handling for the `NNN-name` ordering convention.
//!
//! Source files and directories carry an optional numeric prefix (`NNN-`) that
//! controls their order on disk but never appears in a published URL:
//!
//! - `010-guides/` → `guides`
//! - `01-getting-started.md` → `getting-started`
//! - `../02-guides/01-writing.md` (a relative link) → `../guides/writing.md`

/// Result of parsing a numbered entry name like `020-getting-started`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `20` from `020-getting-started`)
    pub number: Option<u32>,
    /// Raw name part after `NNN-`. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
}

/// Parse an entry name following the `NNN-name` convention.
///
/// - `"020-getting-started"` → number=Some(20), name="getting-started"
/// - `"001"` → number=Some(1), name=""
/// - `"guides"` → number=None, name="guides"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, rest)) = name.split_once('-') {
        if is_ordering_number(prefix) {
            return ParsedName {
                number: prefix.parse().ok(),
                name: rest.to_string(),
            };
        }
    }
    if is_ordering_number(name) {
        return ParsedName {
            number: name.parse().ok(),
            name: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: name.to_string(),
    }
}

fn is_ordering_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// URL-safe path section for a directory or file entry.
///
/// Files lose their extension, then the ordering prefix is stripped. An entry
/// that is nothing but a number keeps its full stem.
pub fn path_section(entry_name: &str, is_file: bool) -> String {
    let stem = if is_file {
        entry_name
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .map_or(entry_name, |(stem, _)| stem)
    } else {
        entry_name
    };
    let parsed = parse_entry_name(stem);
    if parsed.name.is_empty() {
        stem.to_string()
    } else {
        parsed.name
    }
}

/// Remove every `/NNN-` ordering prefix from a relative link path.
pub fn strip_link_prefixes(link: &str) -> String {
    let mut out = String::with_capacity(link.len());
    let mut rest = link;
    while let Some(slash) = rest.find('/') {
        out.push_str(&rest[..=slash]);
        rest = &rest[slash + 1..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && rest.as_bytes().get(digits) == Some(&b'-') {
            rest = &rest[digits + 1..];
        }
    }
    out.push_str(rest);
    out
}
