use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oplookup::output::{print_json, print_resolution};
use oplookup::query::{QueryService, ResolveOptions, Resolution};
use oplookup::store::stats::show_stats;
use oplookup::store::{RecordStore, Status};
use oplookup::utils::{get_config_path, ResolverConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "OPLOOKUP_LOG";

#[derive(Parser)]
#[command(name = "oplookup")]
#[command(about = "Resolve oil and gas operator names to contact records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot file (overrides OPLOOKUP_SNAPSHOT and the config file)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Config file (defaults to the app config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a free-text operator name
    Resolve {
        /// Operator name (words are joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,

        /// Only return operators with this status (OPEN, CANCELLED, ...)
        #[arg(short, long)]
        status: Option<Status>,

        /// Maximum number of candidates
        #[arg(short, long)]
        max: Option<usize>,

        /// Minimum similarity score for fuzzy candidates (0.0 - 1.0)
        #[arg(short, long)]
        floor: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up an exact operator key (no fuzzy matching)
    Lookup {
        #[arg(required = true, trailing_var_arg = true)]
        key: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show snapshot statistics
    Stats {
        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that a snapshot file loads cleanly
    Validate {
        /// Snapshot file to check
        file: PathBuf,
    },
    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("oplookup=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging();

    let config = load_config(cli.config.as_deref())?;
    let color = !cli.no_color;

    match cli.command {
        Commands::Resolve {
            query,
            status,
            max,
            floor,
            json,
        } => {
            let service = open_service(&config, cli.snapshot.as_deref())?;
            let options = ResolveOptions {
                status_filter: status,
                max_candidates: max,
                similarity_floor: floor,
            };
            let resolution = service.resolve(&query.join(" "), &options);
            print(&resolution, json, color)?;
            Ok(exit_code(&resolution))
        }
        Commands::Lookup { key, json } => {
            let service = open_service(&config, cli.snapshot.as_deref())?;
            let key = key.join(" ");
            let resolution = match service.lookup(&key) {
                Some(record) => Resolution::Found {
                    key: oplookup::normalize::normalize_key(&key),
                    record,
                },
                None => Resolution::NotFound,
            };
            print(&resolution, json, color)?;
            Ok(exit_code(&resolution))
        }
        Commands::Stats { json } => {
            let service = open_service(&config, cli.snapshot.as_deref())?;
            let stats = service.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                show_stats(&stats);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { file } => {
            let store = RecordStore::open(&file)
                .with_context(|| format!("Invalid snapshot {}", file.display()))?;
            println!(
                "{}: {} operators, {} aliases",
                file.display(),
                store.len(),
                store.alias_count()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = config.save()?;
                eprintln!("Saved configuration to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<ResolverConfig> {
    match explicit {
        Some(path) => ResolverConfig::load_from(path),
        None => ResolverConfig::load().with_context(|| {
            let path = get_config_path().unwrap_or_default();
            format!("Failed to load config {}", path.display())
        }),
    }
}

fn open_service(config: &ResolverConfig, snapshot: Option<&Path>) -> Result<QueryService> {
    let path = config.snapshot_path(snapshot)?;
    QueryService::open(&path, config.clone())
        .with_context(|| format!("Failed to load snapshot {}", path.display()))
}

fn print(resolution: &Resolution, json: bool, color: bool) -> Result<()> {
    if json {
        print_json(resolution)?;
    } else {
        print_resolution(resolution, color)?;
    }
    Ok(())
}

/// Exit status 1 when nothing was found, like grep
fn exit_code(resolution: &Resolution) -> ExitCode {
    if resolution.is_not_found() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
