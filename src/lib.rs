//! # markfold
//!
//! A static documentation site generator for versioned, multi-locale
//! Markdown trees. Your filesystem is the data source: top-level folders are
//! locales, numbered files and folders are ordered pages, and the headings of
//! every document become the navigation menu.
//!
//! # Architecture: Assembly Pipeline
//!
//! A build runs in one pass, each stage handing an in-memory structure to the
//! next:
//!
//! ```text
//! 1. Scan      docs/          →  FileNode tree      (which documents exist)
//! 2. Convert   FileNode tree  →  ContentNode tree   (Markdown → HTML, anchors, metadata)
//! 3. Assemble  ContentNode    →  Navigation + ContentCache
//! 4. Render    ContentCache   →  public/            (Tera templates, hashed assets)
//! ```
//!
//! Assembly is a pure function of the content tree: run it twice and it
//! yields the same menus and the same page contexts. Only the first and last
//! stages touch the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the source folder into a `FileNode` tree; file-system primitives |
//! | [`naming`] | `NNN-name` ordering-prefix convention for files, folders and links |
//! | [`metadata`] | `<!-- key: value -->` metadata blocks at the top of documents |
//! | [`convert`] | Markdown → HTML with heading ids, link and image rewriting |
//! | [`content`] | Converts the scanned tree into a `ContentNode` tree, in parallel |
//! | [`navigation`] | Builds navigation menus and the content cache; anchor nesting |
//! | [`routes`] | Route joining and base-URL composition |
//! | [`assets`] | Hashed publishing of theme and content assets, optional transform hook |
//! | [`templates`] | Tera wrapper: partials, lazy page templates, theme helpers |
//! | [`generate`] | Renders pages, the site index and `versions.json` |
//! | [`pipeline`] | Runs the stages in order for one config |
//! | [`config`] | `markfold.toml`, `theme.toml` and `site.toml` loading and validation |
//! | [`types`] | Types shared between stages and handed to templates |
//! | [`output`] | CLI output formatting for `check` and `build` |
//! | [`scaffold`] | `markfold init` starter project |
//!
//! # Design Decisions
//!
//! ## Tera for Themes
//!
//! Themes are user files shipped next to the content, so pages render through
//! [Tera](https://keats.github.io/tera/) templates loaded at build time.
//! Small fixed markup, like image tags inside documents, is produced with
//! [Maud](https://maud.lambda.xyz/) instead.
//!
//! ## Locales and Versions as URL Trees
//!
//! Every locale gets its own navigation tree, and every build publishes one
//! version of it:
//!
//! ```text
//! docs/en/02-guides/01-writing.md  →  /en/2.0.0/guides/writing.html
//! docs/fr/02-guides/01-writing.md  →  /fr/2.0.0/guides/writing.html
//! ```
//!
//! Earlier versions stay in the output folder untouched; `versions.json`
//! lists everything published so far so themes can offer a version switch.
//!
//! ## NNN-Prefix Ordering
//!
//! Files and folders use a numeric prefix (`01-`, `020-`) for explicit
//! ordering. The prefix is dropped from published URLs and from relative
//! links between documents, so reordering pages never breaks links.
//!
//! ## Content-Hashed Assets
//!
//! Styles, scripts and images are published as `name.<hash>.ext`. Templates
//! look assets up by their original name, and caches never serve stale files.

pub mod assets;
pub mod config;
pub mod content;
pub mod convert;
pub mod generate;
pub mod metadata;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod pipeline;
pub mod routes;
pub mod scaffold;
pub mod scan;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
