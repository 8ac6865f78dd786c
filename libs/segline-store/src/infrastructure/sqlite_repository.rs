//! SQLite Segment Repository Implementation
//!
//! This module implements the `SegmentRepository` trait on a relational schema:
//!
//! ```sql
//! segments(seg_id PRIMARY KEY, slug UNIQUE NOT NULL)
//! users_with_segments(user_id, seg_id REFERENCES segments ON DELETE CASCADE,
//!                     UNIQUE(user_id, seg_id))
//! ```
//!
//! Every multi-row operation runs inside one transaction that is rolled back
//! on error. Blocking SQLite calls are moved off the async runtime with
//! `spawn_blocking`.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction};
use segline_domain::{Segment, SegmentError, SegmentId, SegmentRepository, UserId};
use tokio::task;
use tracing::{debug, error, info, Instrument};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS segments (
        seg_id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug   TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS users_with_segments (
        user_id INTEGER NOT NULL,
        seg_id  INTEGER NOT NULL REFERENCES segments (seg_id) ON DELETE CASCADE,
        UNIQUE (user_id, seg_id)
    );
";

/// SQLite-based implementation of the SegmentRepository port
///
/// The connection sits behind a mutex; clones share it.
#[derive(Clone)]
pub struct SqliteSegmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSegmentRepository {
    /// Open (or create) a database file and apply the schema
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::Storage` if the file cannot be opened or the
    /// schema cannot be applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SegmentError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening SQLite segment repository");
        let conn = Connection::open(path).map_err(map_sqlite_error)?;
        Self::from_connection(conn)
    }

    /// Create a private in-memory database (useful for tests)
    pub fn open_in_memory() -> Result<Self, SegmentError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_error)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, SegmentError> {
        conn.execute_batch(SCHEMA).map_err(|e| {
            error!(error = %e, "Failed to apply segment schema");
            map_sqlite_error(e)
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, SegmentError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, SegmentError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut *guard)
        })
        .await
        .map_err(|e| SegmentError::storage(format!("blocking task failed: {e}")))?
    }
}

/// Owned view of a segment handed to blocking closures
type SegmentKey = (Option<i64>, String);

fn segment_keys(segments: &[Segment]) -> Vec<SegmentKey> {
    segments
        .iter()
        .map(|s| (s.id().map(i64::from), s.slug().to_string()))
        .collect()
}

fn map_sqlite_error(err: rusqlite::Error) -> SegmentError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => SegmentError::not_found("no matching row"),
        other => SegmentError::storage(other.to_string()),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn row_to_segment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Segment> {
    Ok(Segment::from_parts(
        SegmentId::new(row.get(0)?),
        row.get::<_, String>(1)?,
    ))
}

fn segment_exists(tx: &Transaction<'_>, seg_id: i64) -> Result<bool, SegmentError> {
    tx.prepare_cached("SELECT EXISTS (SELECT 1 FROM segments WHERE seg_id = ?1)")
        .and_then(|mut stmt| stmt.query_row(params![seg_id], |row| row.get(0)))
        .map_err(map_sqlite_error)
}

fn remove_memberships(
    tx: &Transaction<'_>,
    user_id: i64,
    segments: &[SegmentKey],
) -> Result<(), SegmentError> {
    let mut stmt = tx
        .prepare_cached("DELETE FROM users_with_segments WHERE user_id = ?1 AND seg_id = ?2")
        .map_err(map_sqlite_error)?;

    for seg_id in segments.iter().filter_map(|(id, _)| *id) {
        stmt.execute(params![user_id, seg_id])
            .map_err(map_sqlite_error)?;
    }
    Ok(())
}

fn insert_memberships(
    tx: &Transaction<'_>,
    user_id: i64,
    segments: &[SegmentKey],
) -> Result<(), SegmentError> {
    for (id, slug) in segments {
        let seg_id = match id {
            Some(seg_id) if segment_exists(tx, *seg_id)? => *seg_id,
            _ => return Err(SegmentError::not_found(format!("segment {slug}"))),
        };

        tx.prepare_cached(
            "INSERT OR IGNORE INTO users_with_segments (user_id, seg_id) VALUES (?1, ?2)",
        )
        .and_then(|mut stmt| stmt.execute(params![user_id, seg_id]))
        .map_err(map_sqlite_error)?;
    }
    Ok(())
}

impl SegmentRepository for SqliteSegmentRepository {
    fn create(
        &self,
        mut segment: Segment,
    ) -> impl Future<Output = Result<Segment, SegmentError>> + Send {
        let span = tracing::info_span!("sqlite.create", slug = %segment.slug());

        async move {
            segment.validate()?;
            let slug = segment.slug().to_string();

            let id = self
                .with_conn(move |conn| {
                    let inserted = conn.execute("INSERT INTO segments (slug) VALUES (?1)", params![slug]);
                    match inserted {
                        Ok(_) => Ok(conn.last_insert_rowid()),
                        Err(e) if is_unique_violation(&e) => Err(SegmentError::conflict(slug)),
                        Err(e) => Err(map_sqlite_error(e)),
                    }
                })
                .await?;

            segment.set_id(SegmentId::new(id));
            debug!(seg_id = id, "Inserted segment");
            Ok(segment)
        }
        .instrument(span)
    }

    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Segment, SegmentError>> + Send {
        let span = tracing::debug_span!("sqlite.find_by_slug", slug = %slug);
        let slug = slug.to_string();

        async move {
            self.with_conn(move |conn| {
                conn.query_row(
                    "SELECT seg_id, slug FROM segments WHERE slug = ?1",
                    params![slug],
                    row_to_segment,
                )
                .optional()
                .map_err(map_sqlite_error)?
                .ok_or_else(|| SegmentError::not_found(format!("segment {slug}")))
            })
            .await
        }
        .instrument(span)
    }

    fn delete(&self, segment: &Segment) -> impl Future<Output = Result<(), SegmentError>> + Send {
        let span = tracing::info_span!("sqlite.delete", seg_id = ?segment.id());
        let (id, slug) = (segment.id().map(i64::from), segment.slug().to_string());

        async move {
            let Some(seg_id) = id else {
                return Err(SegmentError::not_found(format!("segment {slug}")));
            };

            // Memberships go with the segment through ON DELETE CASCADE
            let affected = self
                .with_conn(move |conn| {
                    conn.execute("DELETE FROM segments WHERE seg_id = ?1", params![seg_id])
                        .map_err(map_sqlite_error)
                })
                .await?;

            if affected == 0 {
                return Err(SegmentError::not_found(format!("segment {slug}")));
            }
            debug!(seg_id, "Deleted segment");
            Ok(())
        }
        .instrument(span)
    }

    fn add_user_to_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        self.apply_user_segments(user_id, &[], segments)
    }

    fn delete_user_from_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        let span = tracing::info_span!(
            "sqlite.delete_user_from_segments",
            user_id = %user_id,
            count = segments.len()
        );
        let keys = segment_keys(segments);

        async move {
            self.with_conn(move |conn| {
                let tx = conn.transaction().map_err(map_sqlite_error)?;
                remove_memberships(&tx, user_id.get(), &keys)?;
                tx.commit().map_err(map_sqlite_error)
            })
            .await
        }
        .instrument(span)
    }

    fn apply_user_segments(
        &self,
        user_id: UserId,
        remove: &[Segment],
        add: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        let span = tracing::info_span!(
            "sqlite.apply_user_segments",
            user_id = %user_id,
            remove = remove.len(),
            add = add.len()
        );
        let (remove, add) = (segment_keys(remove), segment_keys(add));

        async move {
            self.with_conn(move |conn| {
                // Dropping an uncommitted transaction rolls it back
                let tx = conn.transaction().map_err(map_sqlite_error)?;
                remove_memberships(&tx, user_id.get(), &remove)?;
                insert_memberships(&tx, user_id.get(), &add)?;
                tx.commit().map_err(map_sqlite_error)
            })
            .await
        }
        .instrument(span)
    }

    fn find_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Segment>, SegmentError>> + Send {
        let span = tracing::debug_span!("sqlite.find_by_user", user_id = %user_id);

        async move {
            let segments = self
                .with_conn(move |conn| {
                    let mut stmt = conn
                        .prepare_cached(
                            "SELECT s.seg_id, s.slug FROM segments s \
                             JOIN users_with_segments u ON u.seg_id = s.seg_id \
                             WHERE u.user_id = ?1 ORDER BY s.seg_id",
                        )
                        .map_err(map_sqlite_error)?;

                    let rows = stmt
                        .query_map(params![user_id.get()], row_to_segment)
                        .map_err(map_sqlite_error)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()
                        .map_err(map_sqlite_error)
                })
                .await?;

            if segments.is_empty() {
                return Err(SegmentError::not_found(format!("segments of user {user_id}")));
            }
            Ok(segments)
        }
        .instrument(span)
    }
}
