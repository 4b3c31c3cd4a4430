//! Command-line entry point for the document sorter.
//!
//! # Responsibility
//! - Expose ledger, category and filer operations as subcommands.
//! - Print one status line per result.
//!
//! Categorization is not available here; the `file` subcommand takes the
//! category and new name from the caller.

use clap::{Parser, Subcommand};
use docsort_core::db::open_db;
use docsort_core::{
    init_logging, CategorizeError, CategorizeRequest, DocumentFilter, FileOutcome,
    LedgerRepository, MarkOutcome, Placement, SortService, SorterConfig, SqliteLedgerRepository,
};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "docsort", version, about = "Idempotent document filing ledger")]
struct Cli {
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding unsorted documents.
    #[arg(long)]
    source: Option<PathBuf>,
    /// Root directory for category folders.
    #[arg(long)]
    sorted: Option<PathBuf>,
    /// Ledger database file.
    #[arg(long)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register every file in the source directory.
    Ingest,
    /// Show whether a document has been sorted.
    Status { identifier: String },
    /// Mark a document as sorted.
    Mark { identifier: String },
    /// List existing categories.
    Categories,
    /// Copy a document into a category under a new name.
    File {
        identifier: String,
        category: String,
        new_name: String,
    },
    /// List documents not sorted yet.
    Pending,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_exit module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = SorterConfig::load(cli.config.as_deref()).map_err(|err| err.to_string())?;
    if let Some(source) = cli.source {
        config.source_dir = source;
    }
    if let Some(sorted) = cli.sorted {
        config.sorted_dir = sorted;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let service = SortService::new(
        SqliteLedgerRepository::new(&conn),
        &config.source_dir,
        &config.sorted_dir,
        no_categorizer,
    );

    match cli.command {
        Command::Ingest => {
            let report = service
                .ingest_source_dir()
                .map_err(|err| err.to_string())?;
            println!(
                "ingested inserted={} skipped={}",
                report.inserted, report.skipped
            );
        }
        Command::Status { identifier } => {
            let state = service
                .is_sorted(&identifier)
                .map_err(|err| err.to_string())?;
            println!("{identifier} {}", state.as_str());
        }
        Command::Mark { identifier } => {
            match service
                .mark_sorted(&identifier)
                .map_err(|err| err.to_string())?
            {
                MarkOutcome::Updated => println!("{identifier} marked sorted"),
                MarkOutcome::NotFound => println!("{identifier} not_found"),
            }
        }
        Command::Categories => {
            for category in service.list_categories().map_err(|err| err.to_string())? {
                println!("{category}");
            }
        }
        Command::File {
            identifier,
            category,
            new_name,
        } => match service
            .file(&identifier, &category, &new_name)
            .map_err(|err| err.to_string())?
        {
            FileOutcome::Filed { destination, .. } => {
                println!("{identifier} filed {}", destination.display())
            }
            FileOutcome::SourceMissing { source } => {
                println!("{identifier} source_missing {}", source.display())
            }
        },
        Command::Pending => {
            let pending = service
                .ledger()
                .list_documents(DocumentFilter::Unsorted)
                .map_err(|err| err.to_string())?;
            for document in pending {
                println!("{}", document.identifier);
            }
        }
    }

    Ok(())
}

fn no_categorizer(request: &CategorizeRequest<'_>) -> Result<Placement, CategorizeError> {
    Err(CategorizeError::new(format!(
        "no categorizer configured for `{}`",
        request.identifier
    )))
}
