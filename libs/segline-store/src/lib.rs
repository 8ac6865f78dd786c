//! # Segline Storage Adapters
//!
//! Implementations of the `SegmentRepository` port from `segline-domain`:
//!
//! - [`InMemorySegmentRepository`]: mutex-guarded maps, for tests and local runs
//! - [`SqliteSegmentRepository`]: relational backend on SQLite
//! - [`SegmentStore`]: runtime choice between the two

pub mod infrastructure;

pub use infrastructure::{InMemorySegmentRepository, SegmentStore, SqliteSegmentRepository};
