//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use genreshelf_core::{
    DEFAULT_BATCH_SIZE, DEFAULT_CATALOG_URL, DEFAULT_EXTENSION, DEFAULT_RATING_THRESHOLD,
};

/// Enrich an e-book library with catalog genre metadata and sort by genre.
///
/// Genreshelf scrapes genre tags for each book from an external catalog,
/// persists them as per-book marker files, and lets you list, move, or
/// delete books by genre.
#[derive(Parser, Debug)]
#[command(name = "genreshelf")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Genreshelf subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the enrichment pipeline over a library directory
    Process {
        /// Directory containing the book files
        directory: PathBuf,

        /// Books per batch; also the in-flight fetch bound (1-50)
        #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE as u8, value_parser = clap::value_parser!(u8).range(1..=50))]
        batch_size: u8,

        /// Minimum rating count to pass the popularity gate (inclusive)
        #[arg(short = 't', long, default_value_t = DEFAULT_RATING_THRESHOLD)]
        rating_threshold: u64,

        /// Catalog root URL
        #[arg(long, default_value = DEFAULT_CATALOG_URL)]
        catalog_url: String,

        /// Endpoint of the filename-cleanup capability; omit to sanitize
        /// raw filenames directly
        #[arg(long)]
        cleaner_url: Option<String>,

        /// Book file extension to scan for
        #[arg(short = 'e', long, default_value = DEFAULT_EXTENSION)]
        extension: String,
    },

    /// List genres by frequency from the persisted outcomes
    Genres {
        /// Directory containing the marker files
        directory: PathBuf,

        /// Case-insensitive substring filter on genre names
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Move every book of a genre into a genre-named subfolder
    Move {
        /// Directory containing the books and markers
        directory: PathBuf,

        /// Genre to move (lower-cased index name)
        genre: String,

        /// Book file extension
        #[arg(short = 'e', long, default_value = DEFAULT_EXTENSION)]
        extension: String,
    },

    /// Delete every book of a genre and its markers
    Delete {
        /// Directory containing the books and markers
        directory: PathBuf,

        /// Genre to delete (lower-cased index name)
        genre: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,

        /// Book file extension
        #[arg(short = 'e', long, default_value = DEFAULT_EXTENSION)]
        extension: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_process_default_args() {
        let args = Args::try_parse_from(["genreshelf", "process", "/library"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        match args.command {
            Command::Process {
                batch_size,
                rating_threshold,
                catalog_url,
                cleaner_url,
                extension,
                ..
            } => {
                assert_eq!(batch_size, 15);
                assert_eq!(rating_threshold, 500);
                assert_eq!(catalog_url, DEFAULT_CATALOG_URL);
                assert!(cleaner_url.is_none());
                assert_eq!(extension, "epub");
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_cli_batch_size_zero_rejected() {
        let result = Args::try_parse_from(["genreshelf", "process", "/library", "-b", "0"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_batch_size_over_max_rejected() {
        let result = Args::try_parse_from(["genreshelf", "process", "/library", "-b", "51"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_threshold_flag() {
        let args =
            Args::try_parse_from(["genreshelf", "process", "/library", "-t", "1000"]).unwrap();
        match args.command {
            Command::Process {
                rating_threshold, ..
            } => assert_eq!(rating_threshold, 1000),
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["genreshelf", "-vv", "genres", "/library"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_genres_filter() {
        let args =
            Args::try_parse_from(["genreshelf", "genres", "/library", "--filter", "fic"]).unwrap();
        match args.command {
            Command::Genres { filter, .. } => assert_eq!(filter.as_deref(), Some("fic")),
            _ => panic!("expected genres command"),
        }
    }

    #[test]
    fn test_cli_delete_requires_yes_flag_to_skip_prompt() {
        let args =
            Args::try_parse_from(["genreshelf", "delete", "/library", "horror", "--yes"]).unwrap();
        match args.command {
            Command::Delete { yes, genre, .. } => {
                assert!(yes);
                assert_eq!(genre, "horror");
            }
            _ => panic!("expected delete command"),
        }
    }

    #[test]
    fn test_cli_missing_subcommand_is_error() {
        let result = Args::try_parse_from(["genreshelf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["genreshelf", "--help"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayHelp
        );
    }
}
