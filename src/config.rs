//! Configuration loading.
//!
//! Three TOML files steer a build, each optional:
//!
//! ```text
//! markfold.toml                 # Build config (SiteConfig), next to where you run markfold
//! docs/
//! └── site.toml                 # Site info exposed to templates (SiteInfo)
//! default-theme/
//! └── theme.toml                # Theme defaults (ThemeConfig)
//! ```
//!
//! ## Build config
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! default_locale = "en"           # Locale for single-root builds and the site index
//! base_url = "/"                  # Prefix for every generated URL
//! source_folder = "docs"          # Markdown source tree
//! output_folder = "public"        # Where the site is written
//! theme_folder = "default-theme"  # Templates and theme assets
//! generate_doc_index = false      # Render docs/index.md as /index.html
//! enable_versions = true          # Publish under /<locale>/<version>/
//! enable_locales = true           # Treat top-level folders as locales
//! version_to_publish = "1.0.0"
//! anchor_prefix = "mf-"           # Prefix for heading ids
//! asset_pipeline = ["npx", "lightningcss", "--minify"]  # Optional style/script transform
//!
//! [processing]
//! max_processes = 4                 # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Files are sparse: user values are merged over the stock defaults, then
//! deserialized. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Build config file name.
pub const CONFIG_FILE: &str = "markfold.toml";
/// Theme config file name, inside the theme folder.
pub const THEME_CONFIG_FILE: &str = "theme.toml";
/// Site info file name, inside the source folder.
pub const SITE_INFO_FILE: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `markfold.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub default_locale: String,
    pub base_url: String,
    pub source_folder: PathBuf,
    pub output_folder: PathBuf,
    pub theme_folder: PathBuf,
    /// Render the source root's `index.md` as the site's `/index.html`.
    pub generate_doc_index: bool,
    pub enable_versions: bool,
    pub enable_locales: bool,
    pub version_to_publish: String,
    pub anchor_prefix: String,
    /// Command (program + arguments) transforming theme styles and scripts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_pipeline: Option<Vec<String>>,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            base_url: "/".to_string(),
            source_folder: PathBuf::from("docs"),
            output_folder: PathBuf::from("public"),
            theme_folder: PathBuf::from("default-theme"),
            generate_doc_index: false,
            enable_versions: true,
            enable_locales: true,
            version_to_publish: "1.0.0".to_string(),
            anchor_prefix: "mf-".to_string(),
            asset_pipeline: None,
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_locale.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_locale must not be empty".into(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("base_url must not be empty".into()));
        }
        if self.enable_versions {
            let version = self.version_to_publish.trim();
            if version.is_empty() || version.contains('/') {
                return Err(ConfigError::Validation(
                    "version_to_publish must be a non-empty path segment".into(),
                ));
            }
        }
        if matches!(&self.asset_pipeline, Some(command) if command.is_empty()) {
            return Err(ConfigError::Validation(
                "asset_pipeline must name a command".into(),
            ));
        }
        Ok(())
    }

    /// Version the build publishes, when versioning is enabled.
    pub fn published_version(&self) -> Option<&str> {
        self.enable_versions
            .then_some(self.version_to_publish.as_str())
    }

    pub fn theme_templates_dir(&self) -> PathBuf {
        self.theme_folder.join("templates")
    }

    pub fn theme_assets_dir(&self) -> PathBuf {
        self.theme_folder.join("assets")
    }

    pub fn content_images_dir(&self) -> PathBuf {
        self.source_folder.join("assets").join("images")
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel conversion workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Theme configuration loaded from `<theme>/theme.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Template used by pages without a `template` metadata key.
    pub default_template: String,
    /// Per-locale default template, overriding `default_template`.
    pub locale_templates: BTreeMap<String, String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default_template: "page".to_string(),
            locale_templates: BTreeMap::new(),
        }
    }
}

impl ThemeConfig {
    /// Default template for pages of `locale`.
    pub fn template_for(&self, locale: &str) -> &str {
        self.locale_templates
            .get(locale)
            .map_or(self.default_template.as_str(), String::as_str)
    }
}

/// Site information loaded from `<source>/site.toml`, available to templates
/// as `site`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub keywords: Vec<String>,
    /// Per-locale overrides of the fields above.
    #[serde(skip_serializing)]
    pub locales: BTreeMap<String, SiteInfoOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfoOverride {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl SiteInfo {
    /// Site info as seen from pages of `locale`.
    pub fn for_locale(&self, locale: &str) -> SiteInfo {
        let mut info = SiteInfo {
            locales: BTreeMap::new(),
            ..self.clone()
        };
        if let Some(over) = self.locales.get(locale) {
            if let Some(title) = &over.title {
                info.title = title.clone();
            }
            if let Some(description) = &over.description {
                info.description = description.clone();
            }
            if over.image.is_some() {
                info.image = over.image.clone();
            }
            if let Some(keywords) = &over.keywords {
                info.keywords = keywords.clone();
            }
        }
        info
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a TOML file as a raw value.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// cannot be read or parsed.
pub fn load_raw_toml(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the build config from `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_raw_toml(path)?)
}

/// Load `theme.toml` from a theme folder. A missing file yields the defaults.
pub fn load_theme_config(theme_folder: &Path) -> Result<ThemeConfig, ConfigError> {
    load_optional(&theme_folder.join(THEME_CONFIG_FILE))
}

/// Load `site.toml` from a source folder. A missing file yields empty info.
pub fn load_site_info(source_folder: &Path) -> Result<SiteInfo, ConfigError> {
    load_optional(&source_folder.join(SITE_INFO_FILE))
}

fn load_optional<T>(path: &Path) -> Result<T, ConfigError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match load_raw_toml(path)? {
        Some(value) => Ok(value.try_into()?),
        None => Ok(T::default()),
    }
}

/// Returns a fully-commented stock `markfold.toml` with all keys explained.
///
/// Used by the `gen-config` and `init` CLI commands.
pub fn stock_config_toml() -> &'static str {
    r##"# markfold configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Locale used for single-root builds and for the site index page.
default_locale = "en"

# Prefix for every generated URL. Use "/docs/" when the site is served
# from a sub-path, or a full URL for a CDN.
base_url = "/"

# Markdown source tree. Files and folders may carry an NNN- ordering prefix
# (01-intro.md) that is dropped from published URLs.
source_folder = "docs"

# Where the generated site is written.
output_folder = "public"

# Theme folder: templates/, templates/partials/, assets/ and theme.toml.
theme_folder = "default-theme"

# Render <source_folder>/index.md as the site's /index.html.
generate_doc_index = false

# Publish pages under a version folder (/en/1.0.0/...) and keep
# versions.json up to date.
enable_versions = true

# Treat every top-level folder of the source tree as a locale (en/, fr/, ...).
enable_locales = true

# Version published by this build. Overridden by `markfold build --tag`.
version_to_publish = "1.0.0"

# Prefix for heading ids, so they never clash with theme element ids.
anchor_prefix = "mf-"

# Command transforming theme styles and scripts before they are hashed.
# It gets the content on stdin plus the asset kind ("style" or "script")
# and source path as its last two arguments, and prints the new content.
# Printing nothing keeps the original.
# asset_pipeline = ["npx", "lightningcss", "--minify"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel conversion workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
