use clap::{Parser, Subcommand};
use docsite::registry::ResourceRegistry;
use docsite::render::HtmlRenderer;
use docsite::serve::{self, ServeOptions};
use docsite::{config, files, output, writer};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docsite")]
#[command(about = "Build and serve markdown documentation sites")]
#[command(long_about = "\
Build and serve markdown documentation sites

The content directory is the site. Markdown pages become HTML at extensionless
URLs, static files are copied as-is, and a sidebar, web app manifest,
robots.txt, and sitemap are generated.

Content structure:

  content/
  ├── site.json                # Site config (required; docs.json also accepted)
  ├── .siteignore              # Glob patterns to leave out (optional)
  ├── index.md                 # → /
  ├── 404.md                   # Not-found page (optional)
  ├── guide/
  │   ├── index.md             # → /guide/
  │   └── install.md           # → /guide/install
  ├── img/logo.png             # Copied verbatim
  └── README.md                # Never published

Front matter (optional, between --- lines):
  title, type, summary, order, hidden, hideChildren

Run 'docsite gen-config' to generate a starter site.json.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Log progress (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into an output directory
    Build {
        /// Output directory (cleared before writing)
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Serve the site locally, rebuilding on changes
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        interface: IpAddr,
        /// Do not rebuild when content changes
        #[arg(long)]
        no_watch: bool,
    },
    /// Validate content and show the resulting pages and sidebar
    Check,
    /// Print a starter site.json
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Build { output: dest } => {
            println!("==> Building {}", cli.source.display());
            let registry = build_registry(&cli.source)?;
            output::print_build_output(&registry);
            let summary = writer::write_output(&registry, &dest)?;
            println!("{}", output::format_write_summary(&summary, &dest));
        }
        Command::Serve {
            port,
            interface,
            no_watch,
        } => {
            serve::serve(ServeOptions {
                root: cli.source,
                interface,
                port,
                watch: !no_watch,
            })?;
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let registry = build_registry(&cli.source)?;
            output::print_build_output(&registry);
            println!();
            output::print_sidebar(registry.sidebar());
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_json());
        }
    }

    Ok(())
}

fn build_registry(source: &Path) -> Result<ResourceRegistry, Box<dyn std::error::Error>> {
    let inputs = files::list_files(source)?;
    let mut registry = ResourceRegistry::new(source);
    registry.rebuild(&inputs, &HtmlRenderer)?;
    Ok(registry)
}
