use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use error::CliResult;

#[derive(Parser)]
#[command(name = "csv-async")]
#[command(about = "Generate, parse and stringify CSV data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random CSV records
    Generate {
        /// Generation options file (YAML or JSON)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse CSV text into JSON records
    Parse {
        /// CSV input file (defaults to stdin)
        input: Option<PathBuf>,

        /// Parsing options file (YAML or JSON)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Format a JSON array of rows as CSV text
    Stringify {
        /// JSON input file (defaults to stdin)
        input: Option<PathBuf>,

        /// Stringify options file (YAML or JSON)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    // stdout carries data, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { options, output } => {
            commands::generate::execute(options, output).await
        }

        Commands::Parse {
            input,
            options,
            output,
        } => commands::parse::execute(input, options, output).await,

        Commands::Stringify {
            input,
            options,
            output,
        } => commands::stringify::execute(input, options, output).await,
    }
}
