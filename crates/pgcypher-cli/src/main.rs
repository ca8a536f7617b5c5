//! pgcypher CLI - translate Cypher queries to PostgreSQL.
//!
//! Reads a query from the command line or a file, prints the generated SQL,
//! and can show how a `WHERE` predicate splits into per-binding fragments.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Cypher to PostgreSQL translator.
///
/// Lowers `MATCH ... WHERE ... RETURN` queries into a chain of common table
/// expressions over node and edge tables.
#[derive(Parser)]
#[command(name = "pgcypher")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Suppress info messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// JSON file with table and column names
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Output format options.
#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Plain SQL text or a table (default)
    #[default]
    Table,
    /// Machine-readable JSON format
    Json,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Translate a Cypher query to SQL
    Translate {
        /// Query text
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        query: Option<String>,

        /// Read the query from a file
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Show the fragments the first WHERE clause splits into
    Fragments {
        /// Query text
        query: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else if !cli.quiet {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Translate { query, file } => {
                commands::translate::run(config, query, file.as_deref(), cli.format, cli.quiet)
            }
            Commands::Fragments { query } => {
                commands::fragments::run(config, &query, cli.format, cli.quiet)
            }
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
