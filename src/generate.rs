//! HTML site generation.
//!
//! Last stage of the build. Takes the content cache and navigation trees
//! produced by [`navigation`](crate::navigation) and renders every page
//! through the theme's templates.
//!
//! ## Generated Files
//!
//! ```text
//! public/
//! ├── index.html                 # Site index (generate_doc_index only)
//! ├── versions.json              # {"versions": ["1.0.0", "2.0.0"]}
//! ├── assets/                    # Hashed theme and content assets
//! ├── en/
//! │   ├── 1.0.0/                 # Published earlier, left untouched
//! │   └── 2.0.0/
//! │       ├── index.html
//! │       ├── getting-started.html
//! │       └── guides/
//! │           ├── index.html
//! │           └── writing.html
//! └── fr/
//!     └── 2.0.0/...
//! ```
//!
//! ## Template Context
//!
//! Every page template receives the same keys:
//!
//! | Key | Value |
//! |-----|-------|
//! | `page_title` | Page title |
//! | `main_content` | Rendered body HTML (use `\| safe`) |
//! | `navigation_menu` | Navigation tree of the page's locale |
//! | `locale` | Locale code |
//! | `version` | Published version, absent when versioning is off |
//! | `current_file_path` | Canonical URL of the page |
//! | `child_links` | Links to the pages directly below this one |
//! | `metadata` | Metadata block of the document |
//! | `assets` | `styles` / `scripts` / `images`: file name → hashed URL |
//! | `base_url` | Configured base URL |
//! | `site` | Site info from `site.toml`, locale overrides applied |
//! | `previous_page` / `next_page` | Neighbouring pages in menu order |
//!
//! ## Template Choice
//!
//! A page's `template` metadata wins, then the theme's template for the page's
//! locale, then the theme default.

use crate::assets::SiteAssets;
use crate::config::{SiteInfo, ThemeConfig};
use crate::content::ContentNode;
use crate::metadata::Metadata;
use crate::navigation::{ContentCache, Navigation, PageContext, page_neighbours};
use crate::routes::compose_url;
use crate::scan::{list_dir_names, write_file};
use crate::templates::{TemplateError, ThemeTemplates};
use crate::types::NavigationLink;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tera::Context;
use thiserror::Error;

/// Output file holding every published version.
pub const VERSIONS_FILE: &str = "versions.json";
const SITE_INDEX: &str = "/index.html";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Failed to build render context for {path}: {message}")]
    Context { path: String, message: String },
}

/// Everything pages are rendered against, besides their own context.
#[derive(Debug, Clone, Copy)]
pub struct RenderEnv<'a> {
    pub theme: &'a ThemeConfig,
    pub site: &'a SiteInfo,
    pub assets: &'a SiteAssets,
    pub base_url: &'a str,
    pub output_dir: &'a Path,
}

impl RenderEnv<'_> {
    /// Template for a page: its own choice, else the locale's, else the
    /// theme default.
    pub fn template_for<'t>(&'t self, requested: Option<&'t str>, locale: &str) -> &'t str {
        requested.unwrap_or_else(|| self.theme.template_for(locale))
    }

    fn output_path(&self, route: &str) -> PathBuf {
        self.output_dir.join(route.trim_start_matches('/'))
    }
}

/// Render context handed to templates.
#[derive(Debug, Serialize)]
struct PageView<'a> {
    page_title: &'a str,
    main_content: &'a str,
    navigation_menu: Option<&'a NavigationLink>,
    locale: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    current_file_path: &'a str,
    child_links: &'a [NavigationLink],
    metadata: &'a Metadata,
    assets: &'a SiteAssets,
    base_url: &'a str,
    site: SiteInfo,
    previous_page: Option<&'a NavigationLink>,
    next_page: Option<&'a NavigationLink>,
}

impl PageView<'_> {
    fn context(&self) -> Result<Context, GenerateError> {
        Context::from_serialize(self).map_err(|e| GenerateError::Context {
            path: self.current_file_path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Render every cached page and write it under the output folder.
///
/// Templates are compiled up front (the first missing one aborts), then pages
/// render in parallel. Returns the written files in route order.
pub fn render_pages(
    cache: &ContentCache,
    navigation: &Navigation,
    templates: &mut ThemeTemplates,
    env: &RenderEnv,
) -> Result<Vec<PathBuf>, GenerateError> {
    for page in cache.values() {
        templates.prepare(env.template_for(page.template.as_deref(), &page.locale))?;
    }

    let templates = &*templates;
    cache
        .par_iter()
        .map(|(route, page)| render_page(route, page, navigation, templates, env))
        .collect()
}

fn render_page(
    route: &str,
    page: &PageContext,
    navigation: &Navigation,
    templates: &ThemeTemplates,
    env: &RenderEnv,
) -> Result<PathBuf, GenerateError> {
    let menu = navigation.for_locale(&page.locale);
    let (previous_page, next_page) = match menu {
        Some(menu) => page_neighbours(menu, &page.url),
        None => (None, None),
    };

    let view = PageView {
        page_title: &page.title,
        main_content: &page.content,
        navigation_menu: menu,
        locale: &page.locale,
        version: page.version.as_deref(),
        current_file_path: &page.url,
        child_links: &page.child_links,
        metadata: &page.metadata,
        assets: env.assets,
        base_url: env.base_url,
        site: env.site.for_locale(&page.locale),
        previous_page,
        next_page,
    };

    let template = env.template_for(page.template.as_deref(), &page.locale);
    let html = templates.render(template, &view.context()?)?;
    let path = env.output_path(route);
    write_file(&path, html).map_err(|source| GenerateError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(route = %route, template, "page created");
    Ok(path)
}

/// Render the source root's `index.md` as the site's `/index.html`.
///
/// Only index roots render, and only when `enabled`; an index root that is
/// skipped is reported with a warning. The page uses the default locale and
/// has no navigation menu.
pub fn render_site_index(
    root: &ContentNode,
    enabled: bool,
    default_locale: &str,
    version: Option<&str>,
    templates: &mut ThemeTemplates,
    env: &RenderEnv,
) -> Result<Option<PathBuf>, GenerateError> {
    let Some(html) = root.html().filter(|_| root.is_index()) else {
        return Ok(None);
    };
    if !enabled {
        tracing::warn!(
            "the source folder has an index.md, but generate_doc_index is off; skipping the site index"
        );
        return Ok(None);
    }

    let url = compose_url(env.base_url, SITE_INDEX);
    let empty = Metadata::new();
    let view = PageView {
        page_title: &root.title,
        main_content: html,
        navigation_menu: None,
        locale: default_locale,
        version,
        current_file_path: &url,
        child_links: &[],
        metadata: root.metadata().unwrap_or(&empty),
        assets: env.assets,
        base_url: env.base_url,
        site: env.site.for_locale(default_locale),
        previous_page: None,
        next_page: None,
    };

    let template = env.template_for(root.template(), default_locale);
    let html = templates.get_and_render(template, &view.context()?)?;
    let path = env.output_path(SITE_INDEX);
    write_file(&path, html).map_err(|source| GenerateError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(template, "site index created");
    Ok(Some(path))
}

#[derive(Debug, Serialize)]
struct VersionsManifest<'a> {
    versions: &'a [String],
}

/// Collect every version published so far and write `versions.json`.
///
/// Versions are the folder names under each locale's output folder (or under
/// the output root, minus `assets`, in single-root mode), plus `published`,
/// in version order.
pub fn write_versions_manifest(
    output_dir: &Path,
    locales: &[&str],
    published: &str,
) -> Result<Vec<String>, GenerateError> {
    let mut versions = BTreeSet::new();
    let roots: Vec<PathBuf> = if locales.is_empty() {
        vec![output_dir.to_path_buf()]
    } else {
        locales.iter().map(|l| output_dir.join(l)).collect()
    };

    for root in &roots {
        let names = list_dir_names(root).map_err(|source| GenerateError::Io {
            path: root.clone(),
            source,
        })?;
        versions.extend(names.into_iter().filter(|n| n != "assets"));
    }
    versions.insert(published.to_string());

    let mut versions: Vec<String> = versions.into_iter().collect();
    versions.sort_by_cached_key(|v| version_key(v));
    let path = output_dir.join(VERSIONS_FILE);
    let json = serde_json::to_string(&VersionsManifest {
        versions: &versions,
    })?;
    write_file(&path, json).map_err(|source| GenerateError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(count = versions.len(), "versions file created");
    Ok(versions)
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum VersionPart {
    Number(u64),
    Text(String),
}

/// Sort key comparing dot-separated numeric parts as numbers: `2.0.0` sorts
/// before `10.0.0`.
fn version_key(version: &str) -> Vec<VersionPart> {
    version
        .split('.')
        .map(|part| match part.parse() {
            Ok(n) => VersionPart::Number(n),
            Err(_) => VersionPart::Text(part.to_string()),
        })
        .collect()
}
