//! Segment service - Business logic orchestration
//!
//! The service is the single entry point the boundary layer calls. Every
//! operation except `update_user_segments` delegates straight to the storage
//! port and returns its result unchanged.

use serde::Serialize;

use super::{Segment, SegmentError, UserId};
use crate::storage::SegmentRepository;

/// Outcome of a successful membership update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipUpdate {
    pub user_id: UserId,
    /// Stored slugs of the segments the user was linked to
    pub added: Vec<String>,
    /// Stored slugs of the segments the user was unlinked from
    pub removed: Vec<String>,
}

/// Service for managing segments and user memberships
///
/// ## Static Dispatch
///
/// The service is generic over any `SegmentRepository` implementation, so the
/// storage backend stays invisible to callers.
pub struct SegmentService<R> {
    repository: R,
}

impl<R> SegmentService<R>
where
    R: SegmentRepository,
{
    /// Create a new SegmentService over the given repository
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Create a segment from a raw slug
    ///
    /// # Errors
    ///
    /// - `SegmentError::Validation` if the slug is invalid after normalization
    /// - `SegmentError::Conflict` if the normalized slug already exists
    pub async fn create_segment(&self, slug: &str) -> Result<Segment, SegmentError> {
        self.repository.create(Segment::new(slug)).await
    }

    /// Find a segment by its stored slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Segment, SegmentError> {
        self.repository.find_by_slug(slug).await
    }

    /// Delete a segment and all memberships referencing it
    pub async fn delete_segment(&self, segment: &Segment) -> Result<(), SegmentError> {
        self.repository.delete(segment).await
    }

    /// Resolve a slug and delete the segment it names
    ///
    /// Returns the deleted segment.
    pub async fn delete_by_slug(&self, slug: &str) -> Result<Segment, SegmentError> {
        let segment = self.repository.find_by_slug(slug).await?;
        self.delete_segment(&segment).await?;
        Ok(segment)
    }

    /// Link a user to the given segments
    pub async fn add_user_to_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> Result<(), SegmentError> {
        self.repository.add_user_to_segments(user_id, segments).await
    }

    /// Unlink a user from the given segments
    pub async fn delete_user_from_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> Result<(), SegmentError> {
        self.repository
            .delete_user_from_segments(user_id, segments)
            .await
    }

    /// List the segments a user belongs to
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Segment>, SegmentError> {
        self.repository.find_by_user(user_id).await
    }

    /// Add and remove a user's segments by slug
    ///
    /// Every slug in both lists is resolved before anything is written, so an
    /// unknown slug leaves membership state untouched. Removals are applied
    /// before additions in one atomic repository call; a slug in both lists ends
    /// up added.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::NotFound` if any slug cannot be resolved.
    pub async fn update_user_segments(
        &self,
        user_id: UserId,
        add_slugs: &[String],
        del_slugs: &[String],
    ) -> Result<MembershipUpdate, SegmentError> {
        let to_add = self.resolve_all(add_slugs).await?;
        let to_remove = self.resolve_all(del_slugs).await?;

        self.repository
            .apply_user_segments(user_id, &to_remove, &to_add)
            .await?;

        Ok(MembershipUpdate {
            user_id,
            added: to_add.iter().map(|s| s.slug().to_string()).collect(),
            removed: to_remove.iter().map(|s| s.slug().to_string()).collect(),
        })
    }

    async fn resolve_all(&self, slugs: &[String]) -> Result<Vec<Segment>, SegmentError> {
        let mut segments = Vec::with_capacity(slugs.len());
        for slug in slugs {
            segments.push(self.repository.find_by_slug(slug).await?);
        }
        Ok(segments)
    }
}
