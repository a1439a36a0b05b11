//! Project scaffolding for `markfold init`.
//!
//! Writes a starter project into a directory:
//!
//! ```text
//! markfold.toml                  # Stock config, all options documented
//! default-theme/                 # The bundled theme, ready to customise
//! ├── theme.toml
//! ├── templates/
//! │   ├── page.html
//! │   └── partials/{head,navigation}.html
//! └── assets/{styles/main.css, scripts/main.js}
//! docs/                          # Sample content (skipped with --no-content)
//! ├── site.toml
//! └── en/{index.md, 01-getting-started.md}
//! ```
//!
//! Files that already exist are never overwritten.

use crate::config::{self, CONFIG_FILE, SITE_INFO_FILE, THEME_CONFIG_FILE, SiteConfig};
use crate::scan::write_file;
use std::io;
use std::path::{Path, PathBuf};

/// The bundled theme, relative to the theme folder.
const THEME_FILES: &[(&str, &str)] = &[
    (THEME_CONFIG_FILE, include_str!("../theme/theme.toml")),
    ("templates/page.html", include_str!("../theme/templates/page.html")),
    (
        "templates/partials/head.html",
        include_str!("../theme/templates/partials/head.html"),
    ),
    (
        "templates/partials/navigation.html",
        include_str!("../theme/templates/partials/navigation.html"),
    ),
    (
        "assets/styles/main.css",
        include_str!("../theme/assets/styles/main.css"),
    ),
    (
        "assets/scripts/main.js",
        include_str!("../theme/assets/scripts/main.js"),
    ),
];

const SAMPLE_SITE_INFO: &str = r#"title = "My Docs"
description = "Documentation built with markfold"
keywords = ["documentation"]
"#;

const SAMPLE_INDEX: &str = "\
<!--
page_title: Home
-->
# Welcome

This site is generated from the Markdown files in `docs/`.
Continue with [Getting Started](./01-getting-started.md).
";

const SAMPLE_GETTING_STARTED: &str = "\
# Getting Started

## Writing pages

Add Markdown files under `docs/en/`. A numeric prefix such as `02-` orders
pages in the menu and is dropped from the published URL.

## Building

Run `markfold build`, then open `public/en/1.0.0/index.html`.
";

/// A file considered by [`init_project`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldFile {
    pub path: PathBuf,
    /// `false` when the file already existed and was left alone.
    pub written: bool,
}

/// Write the starter project into `dir`.
pub fn init_project(dir: &Path, with_content: bool) -> io::Result<Vec<ScaffoldFile>> {
    let defaults = SiteConfig::default();
    let mut files = vec![(dir.join(CONFIG_FILE), config::stock_config_toml())];

    let theme_dir = dir.join(&defaults.theme_folder);
    files.extend(THEME_FILES.iter().map(|(rel, content)| (theme_dir.join(rel), *content)));

    if with_content {
        let docs = dir.join(&defaults.source_folder);
        let locale = docs.join(&defaults.default_locale);
        files.push((docs.join(SITE_INFO_FILE), SAMPLE_SITE_INFO));
        files.push((locale.join("index.md"), SAMPLE_INDEX));
        files.push((locale.join("01-getting-started.md"), SAMPLE_GETTING_STARTED));
    }

    let mut result = Vec::with_capacity(files.len());
    for (path, content) in files {
        let written = !path.exists();
        if written {
            write_file(&path, content)?;
        } else {
            tracing::debug!(path = %path.display(), "exists, skipped");
        }
        result.push(ScaffoldFile { path, written });
    }
    Ok(result)
}

/// One line per file: `created` or `exists`.
pub fn format_init_output(files: &[ScaffoldFile]) -> Vec<String> {
    files
        .iter()
        .map(|f| {
            let status = if f.written { "created" } else { "exists " };
            format!("{status} {}", f.path.display())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn init_writes_config_theme_and_content() {
        let tmp = TempDir::new().unwrap();
        let files = init_project(tmp.path(), true).unwrap();

        assert!(files.iter().all(|f| f.written));
        assert!(tmp.path().join("markfold.toml").exists());
        assert!(tmp.path().join("default-theme/templates/page.html").exists());
        assert!(tmp.path().join("default-theme/theme.toml").exists());
        assert!(tmp.path().join("docs/en/index.md").exists());
        assert!(tmp.path().join("docs/site.toml").exists());

        let config = config::load_config(&tmp.path().join("markfold.toml")).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn init_without_content() {
        let tmp = TempDir::new().unwrap();
        init_project(tmp.path(), false).unwrap();
        assert!(tmp.path().join("default-theme").is_dir());
        assert!(!tmp.path().join("docs").exists());
    }

    #[test]
    fn init_keeps_existing_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("markfold.toml"), "enable_locales = false\n").unwrap();

        let files = init_project(tmp.path(), false).unwrap();
        let config_file = &files[0];
        assert!(!config_file.written);
        assert_eq!(
            fs::read_to_string(tmp.path().join("markfold.toml")).unwrap(),
            "enable_locales = false\n"
        );
        assert!(files[1..].iter().all(|f| f.written));

        let lines = format_init_output(&files);
        assert!(lines[0].starts_with("exists "));
        assert!(lines[1].starts_with("created "));
    }

    #[test]
    fn sample_content_is_valid_site_info() {
        let info: config::SiteInfo = toml::from_str(SAMPLE_SITE_INFO).unwrap();
        assert_eq!(info.title, "My Docs");
    }
}
