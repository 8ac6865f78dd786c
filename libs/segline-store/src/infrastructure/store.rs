//! Runtime-selected storage backend
//!
//! `SegmentStore` lets the application pick a backend from configuration while
//! keeping `SegmentService` statically dispatched over a single concrete type.

use std::future::Future;
use std::path::Path;

use segline_domain::{Segment, SegmentError, SegmentRepository, UserId};

use super::{InMemorySegmentRepository, SqliteSegmentRepository};

/// Either storage backend, used interchangeably behind the port
#[derive(Clone)]
pub enum SegmentStore {
    InMemory(InMemorySegmentRepository),
    Sqlite(SqliteSegmentRepository),
}

impl SegmentStore {
    /// Create an empty in-memory store
    pub fn in_memory() -> Self {
        Self::InMemory(InMemorySegmentRepository::new())
    }

    /// Open a SQLite store at the given path
    pub fn sqlite(path: impl AsRef<Path>) -> Result<Self, SegmentError> {
        SqliteSegmentRepository::open(path).map(Self::Sqlite)
    }

    /// Short backend name for logs
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl From<InMemorySegmentRepository> for SegmentStore {
    fn from(repo: InMemorySegmentRepository) -> Self {
        Self::InMemory(repo)
    }
}

impl From<SqliteSegmentRepository> for SegmentStore {
    fn from(repo: SqliteSegmentRepository) -> Self {
        Self::Sqlite(repo)
    }
}

impl SegmentRepository for SegmentStore {
    fn create(
        &self,
        segment: Segment,
    ) -> impl Future<Output = Result<Segment, SegmentError>> + Send {
        async move {
            match self {
                Self::InMemory(repo) => repo.create(segment).await,
                Self::Sqlite(repo) => repo.create(segment).await,
            }
        }
    }

    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Segment, SegmentError>> + Send {
        async move {
            match self {
                Self::InMemory(repo) => repo.find_by_slug(slug).await,
                Self::Sqlite(repo) => repo.find_by_slug(slug).await,
            }
        }
    }

    fn delete(&self, segment: &Segment) -> impl Future<Output = Result<(), SegmentError>> + Send {
        async move {
            match self {
                Self::InMemory(repo) => repo.delete(segment).await,
                Self::Sqlite(repo) => repo.delete(segment).await,
            }
        }
    }

    fn add_user_to_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        async move {
            match self {
                Self::InMemory(repo) => repo.add_user_to_segments(user_id, segments).await,
                Self::Sqlite(repo) => repo.add_user_to_segments(user_id, segments).await,
            }
        }
    }

    fn delete_user_from_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        async move {
            match self {
                Self::InMemory(repo) => repo.delete_user_from_segments(user_id, segments).await,
                Self::Sqlite(repo) => repo.delete_user_from_segments(user_id, segments).await,
            }
        }
    }

    fn apply_user_segments(
        &self,
        user_id: UserId,
        remove: &[Segment],
        add: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        async move {
            match self {
                Self::InMemory(repo) => repo.apply_user_segments(user_id, remove, add).await,
                Self::Sqlite(repo) => repo.apply_user_segments(user_id, remove, add).await,
            }
        }
    }

    fn find_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Segment>, SegmentError>> + Send {
        async move {
            match self {
                Self::InMemory(repo) => repo.find_by_user(user_id).await,
                Self::Sqlite(repo) => repo.find_by_user(user_id).await,
            }
        }
    }
}
