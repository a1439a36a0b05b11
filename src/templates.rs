//! Theme templates.
//!
//! Wraps a [`Tera`] instance loaded from a theme's `templates/` folder:
//!
//! ```text
//! default-theme/templates/
//! ├── page.html                # Page template, referenced as "page"
//! ├── section.html             # Any other template a page may ask for
//! └── partials/
//!     └── navigation.html      # Registered up front as "partials/navigation.html"
//! ```
//!
//! Partials are registered when the theme is loaded so page templates can
//! `{% include %}` or `{% import %}` them. Page templates are compiled the
//! first time a page asks for them and kept for the rest of the build.
//!
//! Helpers available to every template:
//!
//! | Helper | Kind | Result |
//! |--------|------|--------|
//! | `nav_class(current=url)` | filter on a link path | `"current"` for the current page, else `""` |
//! | `nav_state(current=url)` | filter on a link path | initial expand state of a menu item |
//! | `build_link(parts=[...])` | function | parts joined with single slashes |

use crate::scan::list_files;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera, Value};
use thiserror::Error;

const TEMPLATE_EXTENSION: &str = "html";
const PARTIALS_DIR: &str = "partials";
const INDEX_SUFFIX: &str = "/index.html";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template '{name}' not found at {path}")]
    NotFound { name: String, path: PathBuf },
    #[error("Failed to load templates from {path}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("Render error for '{template}': {message}")]
    Render { template: String, message: String },
}

/// Templates of one theme, compiled on demand.
#[derive(Debug)]
pub struct ThemeTemplates {
    tera: Tera,
    templates_dir: PathBuf,
    compiled: HashSet<String>,
}

impl ThemeTemplates {
    /// Load a theme's partials and register the template helpers.
    ///
    /// A missing `partials/` folder is fine; a partial that fails to parse
    /// is an error.
    pub fn load(templates_dir: &Path) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape_html);
        tera.register_filter("nav_class", nav_class);
        tera.register_filter("nav_state", nav_state);
        tera.register_function("build_link", build_link);

        let partials_dir = templates_dir.join(PARTIALS_DIR);
        let mut partials = Vec::new();
        for path in list_files(&partials_dir).map_err(|e| load_error(&partials_dir, e))? {
            if !has_template_extension(&path) {
                continue;
            }
            let source = fs::read_to_string(&path).map_err(|e| load_error(&path, e))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            partials.push((format!("{PARTIALS_DIR}/{file_name}"), source));
        }
        tracing::debug!(count = partials.len(), "registered template partials");
        tera.add_raw_templates(partials)
            .map_err(|e| load_error(&partials_dir, error_chain(&e)))?;

        Ok(Self {
            tera,
            templates_dir: templates_dir.to_path_buf(),
            compiled: HashSet::new(),
        })
    }

    /// Compile template `name` from `<templates>/<name>.html` unless it
    /// already is.
    pub fn prepare(&mut self, name: &str) -> Result<(), TemplateError> {
        if self.compiled.contains(name) {
            return Ok(());
        }
        let path = self.template_path(name);
        if !path.is_file() {
            return Err(TemplateError::NotFound {
                name: name.to_string(),
                path,
            });
        }
        let source = fs::read_to_string(&path).map_err(|e| load_error(&path, e))?;
        self.tera
            .add_raw_template(&registered_name(name), &source)
            .map_err(|e| load_error(&path, error_chain(&e)))?;
        tracing::debug!(template = name, "compiled template");
        self.compiled.insert(name.to_string());
        Ok(())
    }

    /// Render a template compiled with [`prepare`](Self::prepare).
    pub fn render(&self, name: &str, context: &Context) -> Result<String, TemplateError> {
        if !self.compiled.contains(name) {
            return Err(TemplateError::NotFound {
                name: name.to_string(),
                path: self.template_path(name),
            });
        }
        self.tera
            .render(&registered_name(name), context)
            .map_err(|e| TemplateError::Render {
                template: name.to_string(),
                message: error_chain(&e),
            })
    }

    /// Compile if needed, then render.
    pub fn get_and_render(
        &mut self,
        name: &str,
        context: &Context,
    ) -> Result<String, TemplateError> {
        self.prepare(name)?;
        self.render(name, context)
    }

    fn template_path(&self, name: &str) -> PathBuf {
        self.templates_dir.join(registered_name(name))
    }
}

/// HTML escaping that leaves `/` intact.
fn escape_html(text: &str) -> String {
    maud::html! { (text) }.into_string()
}

/// Template names carry the `.html` suffix inside Tera so autoescaping
/// applies to them.
fn registered_name(name: &str) -> String {
    format!("{name}.{TEMPLATE_EXTENSION}")
}

fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e == TEMPLATE_EXTENSION)
        .unwrap_or(false)
}

fn load_error(path: &Path, message: impl ToString) -> TemplateError {
    TemplateError::Load {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Tera reports the useful part (which variable, which line) in nested
/// sources.
fn error_chain(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

// ============================================================================
// Helpers
// ============================================================================

fn current_arg<'a>(args: &'a HashMap<String, Value>, filter: &str) -> tera::Result<&'a str> {
    args.get("current")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects a `current` string")))
}

fn link_arg<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects a link path")))
}

pub(crate) fn nav_class(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let link = link_arg(value, "nav_class")?;
    let current = current_arg(args, "nav_class")?;
    let class = if link == current { "current" } else { "" };
    Ok(Value::String(class.to_string()))
}

/// Initial state of a menu item:
///
/// - anchors never expand: `no-expand`
/// - nothing is expanded while the current page sits at the top level
/// - items on the path to the current page: `loaded-expanded expanded`
/// - everything else: `collapsed`
pub(crate) fn nav_state(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let link = link_arg(value, "nav_state")?;
    let current = current_arg(args, "nav_state")?;

    if link.contains('#') {
        return Ok(Value::String("no-expand".to_string()));
    }

    let link = link.replace(INDEX_SUFFIX, "");
    let current = current.replace(INDEX_SUFFIX, "");
    let state = if current.split('/').count() <= 2 {
        ""
    } else if current.contains(&link) {
        "loaded-expanded expanded"
    } else {
        "collapsed"
    };
    Ok(Value::String(state.to_string()))
}

/// `build_link(parts=["/en", version, "index.html"])`; non-string parts are
/// ignored.
pub(crate) fn build_link(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let parts = args
        .get("parts")
        .and_then(Value::as_array)
        .ok_or_else(|| tera::Error::msg("build_link expects a `parts` array"))?;

    let joined = parts
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join("/");

    let mut link = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && link.ends_with('/') {
            continue;
        }
        link.push(c);
    }
    Ok(Value::String(link))
}
