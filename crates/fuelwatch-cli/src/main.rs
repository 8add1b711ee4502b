mod collect;
mod stations;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fuelwatch-cli")]
#[command(about = "Collect and inspect UK forecourt fuel prices")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one collection cycle and write the snapshot file.
    Collect {
        /// Snapshot destination. Defaults to `FUELWATCH_SNAPSHOT_PATH`.
        #[arg(long)]
        output: Option<PathBuf>,
        /// List the providers that would be fetched and exit.
        #[arg(long)]
        dry_run: bool,
        /// Fetch every feed through the public CORS proxy chain.
        #[arg(long)]
        via_proxies: bool,
    },
    /// Normalize a snapshot file into station records.
    Stations {
        /// Snapshot to read. Defaults to `FUELWATCH_SNAPSHOT_PATH`.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Print records as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the provider table in effect.
    Providers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = fuelwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Collect {
            output,
            dry_run,
            via_proxies,
        }) => {
            let output = output.unwrap_or_else(|| config.snapshot_path.clone());
            collect::run_collect(&config, &output, dry_run, via_proxies).await?;
        }
        Some(Commands::Stations { input, json }) => {
            let input = input.unwrap_or_else(|| config.snapshot_path.clone());
            stations::run_stations(&input, json).await?;
        }
        Some(Commands::Providers) => {
            let providers = fuelwatch_core::load_providers(config.providers_path.as_deref())?;
            for provider in &*providers {
                println!("{:<24} {}", provider.brand_label, provider.endpoint);
            }
        }
        None => println!("fuelwatch-cli: try `collect`, `stations`, or `providers`"),
    }

    Ok(())
}
