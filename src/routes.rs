//! Route and URL composition.
//!
//! Routes are POSIX-style absolute paths inside the published site
//! (`/en/2.0.0/guides/index.html`). URLs are routes composed with the
//! configured base URL (`/docs/en/2.0.0/guides/index.html`).

/// Join a route section onto a base route, collapsing duplicate slashes.
///
/// ```text
/// join_route("/", "/")             → "/"
/// join_route("/", "en/2.0.0")      → "/en/2.0.0"
/// join_route("/en/2.0.0", "guides") → "/en/2.0.0/guides"
/// ```
pub fn join_route(base: &str, section: &str) -> String {
    let joined = collapse_slashes(&format!("{base}/{section}"));
    match joined.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => joined,
    }
}

/// Output file route for a node: `<route>/index.html` for index nodes,
/// `<route>.html` otherwise.
pub fn file_route(route: &str, is_index: bool) -> String {
    if is_index {
        join_route(route, "index.html")
    } else {
        format!("{route}.html")
    }
}

/// Compose a site path with the base URL.
///
/// An empty base counts as `/`. Runs of slashes collapse to one, except the
/// `//` following a URL scheme.
///
/// ```text
/// compose_url("/", "/index.html")           → "/index.html"
/// compose_url("/docs", "assets/main.css")   → "/docs/assets/main.css"
/// compose_url("https://x.org/", "/a.html")  → "https://x.org/a.html"
/// ```
pub fn compose_url(base_url: &str, path: &str) -> String {
    let base = if base_url.is_empty() { "/" } else { base_url };
    let (scheme, rest) = match base.find("://") {
        Some(idx) => base.split_at(idx + 3),
        None => ("", base),
    };
    format!("{scheme}{}", collapse_slashes(&format!("{rest}/{path}")))
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
