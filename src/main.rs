use clap::{Parser, Subcommand};
use markfold::{config, output, pipeline, scaffold};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("MARKFOLD_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("MARKFOLD_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "markfold")]
#[command(about = "Static documentation sites from versioned, multi-locale Markdown trees")]
#[command(long_about = "\
Static documentation sites from versioned, multi-locale Markdown trees

Your filesystem is the data source. Top-level folders are locales, numbered
files and folders are ordered pages, and headings become the navigation menu.

Content structure:

  docs/
  ├── site.toml                    # Site title, description, keywords (optional)
  ├── index.md                     # Site landing page (generate_doc_index)
  ├── assets/images/               # Content images → hashed copies under assets/
  ├── en/                          # Locale root
  │   ├── index.md                 # Locale home page
  │   ├── 01-getting-started.md    # → /en/<version>/getting-started.html
  │   └── 02-guides/               # Section (index.md optional)
  │       ├── index.md             # → /en/<version>/guides/index.html
  │       └── 01-writing.md        # → /en/<version>/guides/writing.html
  └── fr/
      └── ...

Documents may start with a metadata block:

  <!--
  page_title: Custom title     # overrides the first # heading
  template: landing            # theme template (default: page)
  nav_max: 2                   # deepest heading level in the menu
  hidden                       # rendered, but left out of menus
  -->

Run 'markfold gen-config' to generate a documented markfold.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(
        short,
        long,
        global = true,
        env = "MARKFOLD_CONFIG",
        default_value = config::CONFIG_FILE
    )]
    config: PathBuf,

    /// Log debug details (RUST_LOG takes precedence when unset)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Version to publish (overrides version_to_publish)
    #[arg(short, long, env = "MARKFOLD_TAG")]
    tag: Option<String>,

    /// Output directory (overrides output_folder)
    #[arg(short, long, env = "MARKFOLD_OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct InitArgs {
    /// Directory to initialize
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Only write the config and theme, no sample docs
    #[arg(long)]
    no_content: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site: scan → convert → assemble → render
    Build(BuildArgs),
    /// Scan and convert the docs without writing anything
    Check,
    /// Create a config, the default theme and sample docs
    Init(InitArgs),
    /// Print a stock markfold.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build(args) => {
            let mut site_config = config::load_config(&cli.config)?;
            if let Some(tag) = args.tag {
                site_config.version_to_publish = tag;
            }
            if let Some(output) = args.output {
                site_config.output_folder = output;
            }
            site_config.validate()?;
            init_thread_pool(&site_config.processing);

            println!(
                "==> Building {} → {}",
                site_config.source_folder.display(),
                site_config.output_folder.display()
            );
            let report = pipeline::build(&site_config)?;
            output::print_build_output(&report);
            println!("==> Build complete");
        }
        Command::Check => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            println!("==> Checking {}", site_config.source_folder.display());
            let root = pipeline::check(&site_config)?;
            output::print_check_output(&root);
            println!("==> Content is valid");
        }
        Command::Init(args) => {
            let written = scaffold::init_project(&args.dir, !args.no_content)?;
            for line in scaffold::format_init_output(&written) {
                println!("{}", line);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--verbose` forces debug logs; otherwise `RUST_LOG`, defaulting to info.
/// Logs go to stderr so stdout stays the command's report.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
