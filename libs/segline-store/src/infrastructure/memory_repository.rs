//! In-memory Segment Repository Implementation
//!
//! All state sits behind a single mutex, so each port operation observes and
//! mutates segments and memberships as one unit.

use std::collections::{BTreeMap, BTreeSet};
use std::future::{self, Future};
use std::sync::Arc;

use parking_lot::Mutex;
use segline_domain::{Segment, SegmentError, SegmentId, SegmentRepository, UserId};
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct State {
    segments: BTreeMap<SegmentId, Segment>,
    memberships: BTreeSet<(UserId, SegmentId)>,
    last_id: i64,
}

impl State {
    fn create(&mut self, mut segment: Segment) -> Result<Segment, SegmentError> {
        segment.validate()?;

        if self.segments.values().any(|s| s.slug() == segment.slug()) {
            return Err(SegmentError::conflict(segment.slug()));
        }

        // Ids are never reused, even after deletes
        self.last_id += 1;
        let id = SegmentId::new(self.last_id);
        segment.set_id(id);
        self.segments.insert(id, segment.clone());

        Ok(segment)
    }

    fn find_by_slug(&self, slug: &str) -> Result<Segment, SegmentError> {
        self.segments
            .values()
            .find(|s| s.slug() == slug)
            .cloned()
            .ok_or_else(|| SegmentError::not_found(format!("segment {slug}")))
    }

    fn stored_id(&self, segment: &Segment) -> Result<SegmentId, SegmentError> {
        segment
            .id()
            .filter(|id| self.segments.contains_key(id))
            .ok_or_else(|| SegmentError::not_found(format!("segment {}", segment.slug())))
    }

    fn delete(&mut self, segment: &Segment) -> Result<(), SegmentError> {
        let id = self.stored_id(segment)?;
        self.segments.remove(&id);
        self.memberships.retain(|(_, seg_id)| *seg_id != id);
        Ok(())
    }

    fn remove_memberships(&mut self, user_id: UserId, segments: &[Segment]) {
        for id in segments.iter().filter_map(Segment::id) {
            self.memberships.remove(&(user_id, id));
        }
    }

    fn apply(
        &mut self,
        user_id: UserId,
        remove: &[Segment],
        add: &[Segment],
    ) -> Result<(), SegmentError> {
        // Resolve every id before touching memberships
        let add_ids = add
            .iter()
            .map(|s| self.stored_id(s))
            .collect::<Result<Vec<_>, _>>()?;

        self.remove_memberships(user_id, remove);
        self.memberships
            .extend(add_ids.into_iter().map(|id| (user_id, id)));

        Ok(())
    }

    fn find_by_user(&self, user_id: UserId) -> Result<Vec<Segment>, SegmentError> {
        let segments: Vec<Segment> = self
            .memberships
            .range((user_id, SegmentId::new(i64::MIN))..=(user_id, SegmentId::new(i64::MAX)))
            .filter_map(|(_, id)| self.segments.get(id).cloned())
            .collect();

        if segments.is_empty() {
            return Err(SegmentError::not_found(format!("segments of user {user_id}")));
        }
        Ok(segments)
    }
}

/// In-memory implementation of the SegmentRepository port
///
/// Cloning the repository yields a handle to the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemorySegmentRepository {
    state: Arc<Mutex<State>>,
}

impl InMemorySegmentRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored segments
    pub fn segment_count(&self) -> usize {
        self.state.lock().segments.len()
    }

    /// Number of stored memberships
    pub fn membership_count(&self) -> usize {
        self.state.lock().memberships.len()
    }
}

impl SegmentRepository for InMemorySegmentRepository {
    #[instrument(skip(self, segment), fields(slug = %segment.slug()))]
    fn create(
        &self,
        segment: Segment,
    ) -> impl Future<Output = Result<Segment, SegmentError>> + Send {
        let result = self.state.lock().create(segment);
        if let Ok(created) = &result {
            debug!(seg_id = ?created.id(), "Stored segment in memory");
        }
        future::ready(result)
    }

    #[instrument(skip(self))]
    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Segment, SegmentError>> + Send {
        future::ready(self.state.lock().find_by_slug(slug))
    }

    #[instrument(skip(self, segment), fields(seg_id = ?segment.id()))]
    fn delete(&self, segment: &Segment) -> impl Future<Output = Result<(), SegmentError>> + Send {
        future::ready(self.state.lock().delete(segment))
    }

    #[instrument(skip(self, segments), fields(user_id = %user_id, count = segments.len()))]
    fn add_user_to_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        future::ready(self.state.lock().apply(user_id, &[], segments))
    }

    #[instrument(skip(self, segments), fields(user_id = %user_id, count = segments.len()))]
    fn delete_user_from_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        self.state.lock().remove_memberships(user_id, segments);
        future::ready(Ok(()))
    }

    #[instrument(skip(self, remove, add), fields(user_id = %user_id, remove = remove.len(), add = add.len()))]
    fn apply_user_segments(
        &self,
        user_id: UserId,
        remove: &[Segment],
        add: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send {
        future::ready(self.state.lock().apply(user_id, remove, add))
    }

    #[instrument(skip(self))]
    fn find_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Segment>, SegmentError>> + Send {
        future::ready(self.state.lock().find_by_user(user_id))
    }
}
