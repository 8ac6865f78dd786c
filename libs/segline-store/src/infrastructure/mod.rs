//! Storage adapters

mod memory_repository;
mod sqlite_repository;
mod store;

pub use memory_repository::InMemorySegmentRepository;
pub use sqlite_repository::SqliteSegmentRepository;
pub use store::SegmentStore;
