//! End-to-end builds of the fixture docs with the bundled theme.

use markfold::config::SiteConfig;
use markfold::{pipeline, scaffold};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// A scaffolded project (config + default theme) holding the fixture docs.
fn project() -> (TempDir, SiteConfig) {
    let tmp = TempDir::new().unwrap();
    scaffold::init_project(tmp.path(), false).unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/docs");
    copy_dir_recursive(&fixtures, &tmp.path().join("docs")).unwrap();

    let stock = markfold::config::load_config(&tmp.path().join("markfold.toml")).unwrap();
    let config = SiteConfig {
        source_folder: tmp.path().join(&stock.source_folder),
        output_folder: tmp.path().join(&stock.output_folder),
        theme_folder: tmp.path().join(&stock.theme_folder),
        ..stock
    };
    (tmp, config)
}

fn read(config: &SiteConfig, rel: &str) -> String {
    let path: PathBuf = config.output_folder.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[test]
fn builds_every_locale_and_page() {
    let (_tmp, config) = project();
    let report = pipeline::build(&config).unwrap();

    for page in [
        "en/1.0.0/index.html",
        "en/1.0.0/getting-started.html",
        "en/1.0.0/guides/index.html",
        "en/1.0.0/guides/writing.html",
        "en/1.0.0/guides/drafts.html",
        "en/1.0.0/reference/cli.html",
        "fr/1.0.0/index.html",
        "fr/1.0.0/demarrer.html",
    ] {
        assert!(config.output_folder.join(page).is_file(), "missing {page}");
    }
    assert_eq!(report.pages.len(), 8);
    assert!(!config.output_folder.join("en/1.0.0/reference/index.html").exists());

    let manifest: serde_json::Value =
        serde_json::from_str(&read(&config, "versions.json")).unwrap();
    assert_eq!(manifest, serde_json::json!({ "versions": ["1.0.0"] }));
}

#[test]
fn pages_carry_rewritten_links_and_images() {
    let (_tmp, config) = project();
    pipeline::build(&config).unwrap();

    let home = read(&config, "en/1.0.0/index.html");
    assert!(home.contains(r#"href="./getting-started.html#mf-install""#));
    assert!(home.contains("<title>Home - Markfold Docs</title>"));
    assert!(home.contains(r#"<meta name="description" content="Everything about markfold">"#));

    let started = read(&config, "en/1.0.0/getting-started.html");
    assert!(started.contains(r#"<h2 id="mf-install">Install</h2>"#));
    assert!(started.contains(r#"href="./reference/cli.html""#));
    assert!(started.contains(r#"src="/assets/content/images/diagram."#));
    assert!(started.contains(r#"class="img-center""#));
}

#[test]
fn navigation_marks_current_page_and_hides_drafts() {
    let (_tmp, config) = project();
    pipeline::build(&config).unwrap();

    let writing = read(&config, "en/1.0.0/guides/writing.html");
    assert!(writing.contains(r#"class="nav-item loaded-expanded expanded current""#));
    assert!(writing.contains(r#"<a href="/en/1.0.0/reference.html">"#));
    assert!(writing.contains(r#"class="nav-item collapsed ""#));
    assert!(writing.contains(r#"class="nav-item no-expand ""#));
    assert!(!writing.contains("/en/1.0.0/guides/drafts.html"));

    // Hidden pages are still rendered with the full menu.
    let drafts = read(&config, "en/1.0.0/guides/drafts.html");
    assert!(drafts.contains(r#"<a href="/en/1.0.0/guides/writing.html">"#));
}

#[test]
fn locales_get_their_own_site_info() {
    let (_tmp, config) = project();
    pipeline::build(&config).unwrap();

    let fr = read(&config, "fr/1.0.0/demarrer.html");
    assert!(fr.contains(r#"<html lang="fr""#));
    assert!(fr.contains("Documentation Markfold"));
    assert!(!fr.contains("/en/1.0.0/"));

    let en = read(&config, "en/1.0.0/getting-started.html");
    assert!(en.contains("Markfold Docs"));
}

#[test]
fn later_builds_add_versions() {
    let (_tmp, mut config) = project();
    pipeline::build(&config).unwrap();

    config.version_to_publish = "2.0.0".into();
    let report = pipeline::build(&config).unwrap();

    assert_eq!(report.versions, vec!["1.0.0", "2.0.0"]);
    assert!(config.output_folder.join("en/1.0.0/index.html").is_file());
    assert!(config.output_folder.join("en/2.0.0/index.html").is_file());
    let manifest: serde_json::Value =
        serde_json::from_str(&read(&config, "versions.json")).unwrap();
    assert_eq!(manifest["versions"], serde_json::json!(["1.0.0", "2.0.0"]));
}

#[test]
fn check_reports_the_content_tree() {
    let (_tmp, config) = project();
    let root = pipeline::check(&config).unwrap();
    let lines = markfold::output::format_check_output(&root);

    assert_eq!(lines[0], "Content");
    assert!(lines.iter().any(|l| l.contains("Drafts (hidden)")));
    assert!(lines.iter().any(|l| l.contains("reference (no index, 1 page)")));
    assert!(!config.output_folder.exists());
}
