//! Build orchestration.
//!
//! Runs every stage in order against one [`SiteConfig`]:
//!
//! ```text
//! 1. Scan       docs/                  →  FileNode tree
//! 2. Images     docs/assets/images/    →  public/assets/content/images/ (hashed)
//! 3. Convert    FileNode tree          →  ContentNode tree (Markdown → HTML)
//! 4. Assemble   ContentNode tree       →  Navigation + ContentCache
//! 5. Assets     theme/assets/          →  public/assets/{styles,scripts,images}/
//! 6. Render     ContentCache           →  public/**/*.html (+ site index)
//! 7. Versions   public/<locale>/*      →  public/versions.json
//! ```
//!
//! Content images are published before conversion so documents can link to
//! their hashed URLs. The first error at any stage aborts the build.

use crate::assets::{
    AssetError, AssetTransform, CommandTransform, SiteAssets, compile_site_assets,
    copy_content_images,
};
use crate::config::{self, ConfigError, SiteConfig};
use crate::content::{ContentError, ContentNode, build_content_tree};
use crate::convert::{ConvertOptions, Converter};
use crate::generate::{
    GenerateError, RenderEnv, render_pages, render_site_index, write_versions_manifest,
};
use crate::navigation::{Assembler, AssemblyOptions, Navigation};
use crate::scan::{FileNode, ScanError, ScanOptions, scan_tree};
use crate::templates::{TemplateError, ThemeTemplates};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// What a build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub output: PathBuf,
    pub version: Option<String>,
    pub navigation: Navigation,
    /// Written pages, in route order.
    pub pages: Vec<PathBuf>,
    pub site_index: Option<PathBuf>,
    pub assets: SiteAssets,
    /// Every published version, the current one included.
    pub versions: Vec<String>,
}

/// Build the whole site described by `config`.
pub fn build(config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let output = &config.output_folder;
    let version = config.published_version();

    tracing::info!(source = %config.source_folder.display(), "scanning content");
    let tree = scan_tree(&config.source_folder, &ScanOptions::default())?;
    let site = config::load_site_info(&config.source_folder)?;
    let theme = config::load_theme_config(&config.theme_folder)?;

    let content_images =
        copy_content_images(&config.content_images_dir(), output, &config.base_url)?;
    tracing::info!(count = content_images.len(), "content images published");

    let root = convert_content(&tree, config, content_images.clone())?;
    tracing::info!(documents = root.node_count(), "content converted");

    let assembler = Assembler::new(AssemblyOptions {
        locales_enabled: config.enable_locales,
        version: version.map(str::to_string),
        default_locale: config.default_locale.clone(),
        base_url: config.base_url.clone(),
    });
    let (navigation, cache) = assembler.assemble(&root);
    tracing::info!(pages = cache.len(), "navigation assembled");

    let transform = config
        .asset_pipeline
        .as_deref()
        .and_then(CommandTransform::new);
    let mut site_assets = compile_site_assets(
        &config.theme_assets_dir(),
        output,
        &config.base_url,
        transform.as_ref().map(|t| t as &dyn AssetTransform),
    )?;
    merge_content_images(&mut site_assets, content_images);
    tracing::info!(count = site_assets.len(), "theme assets compiled");

    let mut templates = ThemeTemplates::load(&config.theme_templates_dir())?;
    let env = RenderEnv {
        theme: &theme,
        site: &site,
        assets: &site_assets,
        base_url: &config.base_url,
        output_dir: output,
    };

    let site_index = render_site_index(
        &root,
        config.generate_doc_index,
        &config.default_locale,
        version,
        &mut templates,
        &env,
    )?;
    let pages = render_pages(&cache, &navigation, &mut templates, &env)?;
    tracing::info!(count = pages.len(), "pages created");

    let versions = match version {
        Some(version) => write_versions_manifest(output, &navigation.locales(), version)?,
        None => Vec::new(),
    };

    Ok(BuildReport {
        output: output.clone(),
        version: version.map(str::to_string),
        navigation,
        pages,
        site_index,
        assets: site_assets,
        versions,
    })
}

/// Scan and convert the content without writing anything.
pub fn check(config: &SiteConfig) -> Result<ContentNode, BuildError> {
    tracing::info!(source = %config.source_folder.display(), "checking content");
    let tree = scan_tree(&config.source_folder, &ScanOptions::default())?;
    convert_content(&tree, config, BTreeMap::new())
}

fn convert_content(
    tree: &FileNode,
    config: &SiteConfig,
    content_images: BTreeMap<String, String>,
) -> Result<ContentNode, BuildError> {
    let converter = Converter::new(ConvertOptions {
        anchor_prefix: config.anchor_prefix.clone(),
        base_url: config.base_url.clone(),
        content_images,
    });
    Ok(build_content_tree(tree, &converter)?)
}

/// Content images join the theme's under `assets.images`; on a name clash
/// the theme image is kept.
fn merge_content_images(site_assets: &mut SiteAssets, content_images: BTreeMap<String, String>) {
    for (name, url) in content_images {
        site_assets.images.entry(name).or_insert(url);
    }
}
