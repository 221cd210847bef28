use std::path::PathBuf;

use clap::Parser;
use curso_seeder::config::BackendConfig;
use curso_seeder::seed::{self, RunOptions};
use curso_seeder::store::SupabaseStore;
use curso_seeder::{Result, SeedError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;

    let config = BackendConfig::from_env()?;
    match config.key_role() {
        Some(role) => info!(role = %role, "resolved backend credentials"),
        None => info!(key = config.key_kind.env_var(), "resolved backend credentials"),
    }

    let store = SupabaseStore::new(&config)?;
    let options = RunOptions {
        dry_run: cli.dry_run,
        ..RunOptions::default()
    };
    let totals = seed::run(&store, &cli.files, &options)?;

    println!("Done.");
    println!("  lessons:   {}", totals.lessons);
    println!("  exercises: {}", totals.exercises);
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| SeedError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Seed the hosted lessons and exercises tables from course JSON files."
)]
struct Cli {
    /// Course JSON files to process, in the order given.
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Validate the files and report totals without writing to the backend.
    #[arg(long)]
    dry_run: bool,
}
