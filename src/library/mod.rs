//! Genre index and library-management operations.
//!
//! The consumer side of the pipeline: reads the metadata store
//! independently of enrichment runs, aggregates outcomes into a
//! frequency-ranked [`GenreIndex`], and moves or deletes (book, marker)
//! pairs by genre. The store directory is shared with the pipeline; no
//! lock is provided, and concurrent use during an active run is a
//! caller responsibility.

mod index;
mod ops;

pub use index::{GenreIndex, UNPOPULAR_GENRE};
pub use ops::{ItemError, LibraryError, OpReport, delete_genre, move_genre};
