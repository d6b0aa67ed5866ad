//! Lifecycle coordinators: the layer that enforces parent-child invariants
//! (a document's chunks cannot outlive it, a library's documents cannot
//! outlive it) and routes every mutation through the scheduler under the
//! owning library's key, so concurrent writes to the same library's index
//! and records never interleave.
//!
//! All three coordinators serialize under `Key::new("library", library_id)`
//! rather than splitting library- and document-level keys, which the
//! ordering model in SPEC_FULL.md §5 allows as a stricter refinement (it
//! still guarantees the required per-document FIFO, just coarser). This
//! also sidesteps self-deadlock: cascade logic inside a scheduled closure
//! never re-submits to the same key it is already running under.

pub mod chunk;
pub mod document;
pub mod library;

pub use chunk::ChunkCoordinator;
pub use document::DocumentCoordinator;
pub use library::LibraryCoordinator;
