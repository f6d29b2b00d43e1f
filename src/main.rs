use clap::{Parser, Subcommand};
use nexus_archive::{config, export, feed, generate, output, redirect, resolve};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nexus-archive")]
#[command(about = "Static archive generator for the Nexus podcast network")]
#[command(long_about = "\
Static archive generator for the Nexus podcast network

The site is built from a JSON export of the network database. Point --export
at a file, or at a directory holding nexus-export-<timestamp>.json files to
use the newest one.

Project layout:

  .
  ├── config.toml                  # Site config (optional, overrides defaults)
  ├── assets/                      # Static assets (favicon, fonts) → copied to output root
  └── exports/
      ├── nexus-export-1699990000.json
      └── nexus-export-1700000000.json   # newest export wins

Run 'nexus-archive gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Export file, or a directory of nexus-export-*.json files
    #[arg(long, default_value = "exports", global = true)]
    export: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory containing config.toml and the assets directory
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and resolve the export without building
    Check,
    /// Render the full site: pages, feeds and redirects
    Build,
    /// Print one series' fringe feed to stdout
    Feed {
        /// Series slug, e.g. `atn`
        series: String,
    },
    /// Show where a legacy URL path redirects
    Redirect {
        /// Request path, e.g. `/episode/atn-1`
        path: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check => {
            let (loaded, index) = load_index(&cli.export)?;
            output::print_check_output(&loaded, &index);
        }
        Command::Build => {
            let site_config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&site_config.processing);
            let (loaded, index) = load_index(&cli.export)?;
            tracing::info!(fingerprint = %loaded.fingerprint, "Building site");
            let assets_dir = cli.config_dir.join(&site_config.assets_dir);
            let summary = generate::generate(
                &index,
                &site_config,
                &cli.output,
                &assets_dir,
                chrono::Utc::now(),
            )?;
            output::print_build_output(&summary, &cli.output);
        }
        Command::Feed { series } => {
            let site_config = config::load_config(&cli.config_dir)?;
            let (_, index) = load_index(&cli.export)?;
            let Some(found) = index.series_by_slug(&series) else {
                return Err(format!("Unknown series: {series}").into());
            };
            print!(
                "{}",
                feed::render_series_feed(&index, found, &site_config, chrono::Utc::now())
            );
        }
        Command::Redirect { path } => {
            let (_, index) = load_index(&cli.export)?;
            let redirect = redirect::Redirects::new(&index).resolve(&path);
            output::print_redirect_output(&path, redirect.as_ref());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_index(
    path: &Path,
) -> Result<(export::LoadedExport, resolve::Index), Box<dyn std::error::Error>> {
    let loaded = export::load_export(path)?;
    let index = resolve::Index::build(loaded.data.clone())?;
    Ok((loaded, index))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
