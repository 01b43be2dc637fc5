mod import;
mod inspect;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "monica-import")]
#[command(version)]
#[command(
    about = "Import a Monica CRM SQL export into one account of the local contact database",
    long_about = None
)]
pub struct Cli {
    /// Debug logging (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace an account's data with the contents of a Monica export
    Import {
        /// Monica SQL export (.sql, optionally .gz, .bz2, .xz or .zst)
        file: PathBuf,

        /// Destination SQLite database (created if missing)
        #[arg(long, required_unless_present = "dry_run")]
        db: Option<PathBuf>,

        /// Account that receives the imported data
        #[arg(short, long)]
        account: String,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,

        /// Show progress while reading and importing
        #[arg(short, long)]
        progress: bool,

        /// Import into an in-memory database and discard the result
        #[arg(long)]
        dry_run: bool,
    },

    /// List the Monica tables found in an export
    Inspect {
        /// Monica SQL export (.sql, optionally .gz, .bz2, .xz or .zst)
        file: PathBuf,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Commands::Import {
            file,
            db,
            account,
            config,
            json,
            progress,
            dry_run,
        } => import::run(import::ImportArgs {
            file,
            db,
            account,
            config,
            json,
            progress,
            dry_run,
        }),
        Commands::Inspect { file, json } => inspect::run(file, json),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.format_timestamp(None).try_init();
}
