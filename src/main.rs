//! CLI entry point for the genreshelf tool.

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use genreshelf_core::{
    BookFile, CatalogClient, EnrichConfig, EnrichEngine, GenreIndex, HttpFetcher, HttpNameCleaner,
    MetadataStore, NameCleaner, delete_genre, move_genre,
};
use genreshelf_core::enrich::ProgressFn;

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match args.command {
        Command::Process {
            directory,
            batch_size,
            rating_threshold,
            catalog_url,
            cleaner_url,
            extension,
        } => {
            let config = EnrichConfig {
                catalog_url,
                cleaner_url,
                rating_threshold,
                batch_size: usize::from(batch_size),
                extension,
                reveal_wait: Duration::from_secs(1),
            };
            run_process(&directory, config, args.quiet).await
        }
        Command::Genres { directory, filter } => run_genres(&directory, filter.as_deref()),
        Command::Move {
            directory,
            genre,
            extension,
        } => run_move(&directory, &genre, &extension),
        Command::Delete {
            directory,
            genre,
            yes,
            extension,
        } => run_delete(&directory, &genre, &extension, yes),
    }
}

/// Runs the enrichment pipeline over a library directory.
async fn run_process(directory: &Path, config: EnrichConfig, quiet: bool) -> Result<()> {
    info!(directory = %directory.display(), "genreshelf starting");

    let fetcher = Arc::new(HttpFetcher::new());
    let catalog = Arc::new(CatalogClient::new(
        fetcher,
        config.catalog_url.clone(),
        config.reveal_wait,
    ));
    let cleaner: Option<Arc<dyn NameCleaner>> = config.cleaner_url.clone().map(|url| {
        Arc::new(HttpNameCleaner::new(reqwest::Client::new(), url)) as Arc<dyn NameCleaner>
    });
    if cleaner.is_none() {
        info!("no cleaner endpoint configured; sanitizing raw filenames");
    }

    let engine = EnrichEngine::new(catalog, cleaner, config)?;

    let pending = engine.pending(directory)?;
    if pending.is_empty() {
        info!("nothing to process; every book already has an outcome");
        return Ok(());
    }

    let progress = if quiet {
        None
    } else {
        let bar = ProgressBar::new(pending.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    };

    let progress_fn: Option<ProgressFn> = progress.as_ref().map(|bar| {
        let bar = bar.clone();
        Arc::new(move |book: &BookFile| {
            bar.set_message(book.file_name.clone());
            bar.inc(1);
        }) as ProgressFn
    });

    let stats = engine.process_with_progress(directory, progress_fn).await?;

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    info!(
        tagged = stats.tagged(),
        unpopular = stats.unpopular(),
        unknown = stats.unknown(),
        skipped = stats.skipped(),
        write_errors = stats.write_errors(),
        "processing complete"
    );

    Ok(())
}

/// Prints the frequency-ranked genre list, optionally filtered.
fn run_genres(directory: &Path, filter: Option<&str>) -> Result<()> {
    let store = MetadataStore::new(directory);
    let index = GenreIndex::rebuild(&store)?;

    if index.is_empty() {
        info!("no genre outcomes found; run `genreshelf process` first");
        return Ok(());
    }

    let needle = filter.unwrap_or("").to_lowercase();
    for (genre, frequency) in index.ranked() {
        if genre.contains(&needle) {
            println!("{genre} ({frequency})");
        }
    }
    Ok(())
}

/// Moves every book of a genre into a genre-named subfolder.
fn run_move(directory: &Path, genre: &str, extension: &str) -> Result<()> {
    let store = MetadataStore::new(directory);
    let index = GenreIndex::rebuild(&store)?;

    let report = move_genre(directory, &index, genre, extension)?;
    println!("Moved {} files to '{}'", report.affected, genre);
    report_errors(&report.errors);
    Ok(())
}

/// Deletes every book of a genre after confirmation.
fn run_delete(directory: &Path, genre: &str, extension: &str, yes: bool) -> Result<()> {
    let store = MetadataStore::new(directory);
    let index = GenreIndex::rebuild(&store)?;

    let book_count = index.books_for(genre).map_or(0, std::collections::BTreeSet::len);
    if book_count == 0 {
        println!("No books found for genre '{genre}'");
        return Ok(());
    }

    if !yes && !confirm(&format!("Delete {book_count} books for genre '{genre}'? [y/N] "))? {
        println!("Aborted");
        return Ok(());
    }

    let report = delete_genre(directory, &index, genre, extension);
    println!("Deleted {} files for genre '{}'", report.affected, genre);
    report_errors(&report.errors);
    Ok(())
}

/// Prompts on stdout and reads a yes/no answer from stdin.
fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        bail!("refusing to delete without confirmation; pass --yes in non-interactive use");
    }
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Prints collected per-item failures from a bulk operation.
fn report_errors(errors: &[genreshelf_core::library::ItemError]) {
    for error in errors {
        warn!(file = %error.file, reason = %error.reason, "operation failed for file");
    }
}
