//! Theme and content asset publishing.
//!
//! Every asset is published under a content-hashed name so that browsers can
//! cache it forever and a changed file always gets a new URL:
//!
//! ```text
//! default-theme/assets/styles/main.css    →  public/assets/styles/main.3f9a0c21be.css
//! default-theme/assets/scripts/main.js    →  public/assets/scripts/main.8b1e07d44f.js
//! default-theme/assets/images/logo.svg    →  public/assets/images/logo.02c6a9e1f3.svg
//! docs/assets/images/diagram.png          →  public/assets/content/images/diagram.77d0b5e9a2.png
//! ```
//!
//! The hash is the first 10 hex characters of the SHA-256 digest of the
//! published bytes.
//!
//! ## Transform hook
//!
//! Styles and scripts may pass through an [`AssetTransform`] before hashing
//! (minifiers, preprocessors). The stock implementation, [`CommandTransform`],
//! runs a configured command with the file content on stdin and publishes
//! whatever it prints. Empty output keeps the original content; a non-zero
//! exit aborts the build.

use crate::routes::compose_url;
use crate::scan::{list_files, write_file};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Number of hex characters of the digest kept in published names.
pub const HASH_LEN: usize = 10;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Asset transform failed for {path}: {message}")]
    Transform { path: PathBuf, message: String },
}

/// Kind of theme asset, which decides its output folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Style,
    Script,
    Image,
}

impl AssetKind {
    pub fn folder(self) -> &'static str {
        match self {
            AssetKind::Style => "styles",
            AssetKind::Script => "scripts",
            AssetKind::Image => "images",
        }
    }

    /// Name passed to transform hooks.
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Style => "style",
            AssetKind::Script => "script",
            AssetKind::Image => "image",
        }
    }
}

/// Original file name → published URL, per asset kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteAssets {
    pub styles: BTreeMap<String, String>,
    pub scripts: BTreeMap<String, String>,
    pub images: BTreeMap<String, String>,
}

impl SiteAssets {
    pub fn len(&self) -> usize {
        self.styles.len() + self.scripts.len() + self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rewrites style and script content before it is published.
pub trait AssetTransform: Send + Sync {
    /// Return the new content, or `None` to publish the original.
    fn transform(
        &self,
        content: &[u8],
        kind: AssetKind,
        path: &Path,
    ) -> Result<Option<Vec<u8>>, AssetError>;
}

/// Runs an external command as the asset transform.
///
/// The command receives the asset kind and source path as its last two
/// arguments and the content on stdin.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    program: String,
    args: Vec<String>,
}

impl CommandTransform {
    /// Build from a `[program, args...]` list. `None` if the list is empty.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl AssetTransform for CommandTransform {
    fn transform(
        &self,
        content: &[u8],
        kind: AssetKind,
        path: &Path,
    ) -> Result<Option<Vec<u8>>, AssetError> {
        let failed = |message: String| AssetError::Transform {
            path: path.to_path_buf(),
            message,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(kind.label())
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("failed to start `{}`: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| failed("stdin unavailable".into()))?;

        let output = std::thread::scope(|scope| {
            scope.spawn(move || {
                // A command that exits without reading closes the pipe early;
                // its exit status reports the failure.
                let _ = stdin.write_all(content);
            });
            child.wait_with_output()
        })
        .map_err(|e| failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("{} ({})", stderr.trim(), output.status)));
        }
        if output.stdout.is_empty() {
            return Ok(None);
        }
        Ok(Some(output.stdout))
    }
}

/// First [`HASH_LEN`] hex characters of the SHA-256 digest of `bytes`.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = format!("{:x}", digest);
    hex.truncate(HASH_LEN);
    hex
}

/// `main.css` + `abc` → `main.abc.css`; `LICENSE` + `abc` → `LICENSE.abc`.
pub fn hashed_file_name(file_name: &str, hash: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}.{hash}.{ext}"),
        _ => format!("{file_name}.{hash}"),
    }
}

/// Publish the theme's `styles/`, `scripts/` and `images/` folders.
///
/// Missing folders publish nothing.
pub fn compile_site_assets(
    theme_assets: &Path,
    output_dir: &Path,
    base_url: &str,
    transform: Option<&dyn AssetTransform>,
) -> Result<SiteAssets, AssetError> {
    let publish = |kind: AssetKind| {
        let transform = match kind {
            AssetKind::Style | AssetKind::Script => transform,
            AssetKind::Image => None,
        };
        publish_folder(
            &theme_assets.join(kind.folder()),
            output_dir,
            kind.folder(),
            base_url,
            |content, path| match transform {
                Some(t) => t.transform(content, kind, path),
                None => Ok(None),
            },
        )
    };

    Ok(SiteAssets {
        styles: publish(AssetKind::Style)?,
        scripts: publish(AssetKind::Script)?,
        images: publish(AssetKind::Image)?,
    })
}

/// Publish content images from `<source>/assets/images` under
/// `assets/content/images`.
pub fn copy_content_images(
    images_dir: &Path,
    output_dir: &Path,
    base_url: &str,
) -> Result<BTreeMap<String, String>, AssetError> {
    publish_folder(images_dir, output_dir, "content/images", base_url, |_, _| {
        Ok(None)
    })
}

fn publish_folder(
    source_dir: &Path,
    output_dir: &Path,
    folder: &str,
    base_url: &str,
    transform: impl Fn(&[u8], &Path) -> Result<Option<Vec<u8>>, AssetError>,
) -> Result<BTreeMap<String, String>, AssetError> {
    let mut published = BTreeMap::new();
    for path in list_files(source_dir).map_err(io_error(source_dir))? {
        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let original = fs::read(&path).map_err(io_error(&path))?;
        let content = transform(&original, &path)?.unwrap_or(original);

        let target_name = hashed_file_name(&file_name, &hash_bytes(&content));
        let target = output_dir.join("assets").join(folder).join(&target_name);
        write_file(&target, &content).map_err(io_error(&target))?;

        let url = compose_url(base_url, &format!("assets/{folder}/{target_name}"));
        tracing::debug!(url = %url, "published asset");
        published.insert(file_name, url);
    }
    Ok(published)
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> AssetError + use<> {
    let path = path.to_path_buf();
    move |source| AssetError::Io { path, source }
}
