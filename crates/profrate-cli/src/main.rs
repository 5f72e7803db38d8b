mod db;
mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "profrate-cli")]
#[command(about = "Professor ratings command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Fetch professors from RateMyProfessors and store them
    Scrape {
        /// School to scrape; defaults to `PROFRATE_DEFAULT_SCHOOL_ID`
        #[arg(long)]
        school_id: Option<i64>,

        /// Stop after this many professors
        #[arg(long)]
        limit: Option<usize>,

        /// Reconcile into an in-memory store instead of the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Print row counts for the professors table
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = profrate_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Migrate => db::migrate(&config).await,
        Commands::Scrape {
            school_id,
            limit,
            dry_run,
        } => {
            let school_id = school_id.unwrap_or(config.default_school_id);
            scrape::run(&config, school_id, limit, dry_run).await
        }
        Commands::Stats => db::stats(&config).await,
    }
}
