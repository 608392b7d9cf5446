use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use weekend_recs::analysis::analyze_csv;
use weekend_recs::directory::YelpClient;
use weekend_recs::geocode::MapboxClient;
use weekend_recs::http::build_client;
use weekend_recs::{write_recommendations, Collector, Config};

#[derive(Debug, Parser)]
#[command(name = "weekend-recs", version, about = "Scrape and analyze weekend restaurant recommendations")]
struct Cli {
    /// TOML configuration file (defaults to ./recs.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape the listing, enrich every recommendation and write the CSV.
    Collect {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Chart the collected CSV.
    Analyze {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        figures: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("weekend-recs error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = Config::load_with_dotenv(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Collect { output } => {
            config.ensure_api_keys()?;
            let output = output.unwrap_or_else(|| config.output.csv_path.clone());

            let http = build_client(&config.http)?;
            let collector = Collector::new(
                http.clone(),
                config.listing.url.clone(),
                config.listing.anchor_class.clone(),
                YelpClient::new(http.clone(), &config.directory),
                MapboxClient::new(http, &config.geocoder),
            );

            let records = collector.run().await.context("collection failed")?;
            write_recommendations(&output, &records)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(rows = records.len(), path = %output.display(), "wrote recommendations");
            println!("Wrote {} recommendations to {}", records.len(), output.display());
        }
        Commands::Analyze { input, figures } => {
            let input = input.unwrap_or_else(|| config.output.csv_path.clone());
            let figures = figures.unwrap_or_else(|| config.output.figures_dir.clone());

            let written = analyze_csv(&input, &figures)
                .with_context(|| format!("failed to analyze {}", input.display()))?;
            for path in &written {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("RECS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
