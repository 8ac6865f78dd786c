//! Ports (trait definitions) for external dependencies
//!
//! This module defines the persistence contract that storage adapters must
//! implement. Following hexagonal architecture, the domain defines what it needs,
//! and the infrastructure provides implementations (relational, in-memory).
//!
//! ## Static Dispatch
//!
//! We use native Rust async traits with `impl Future` return types instead of
//! `async_trait` to ensure zero-cost abstractions and static dispatch.

use std::future::Future;

use crate::segment::{Segment, SegmentError, UserId};

/// Port for segment and membership persistence
///
/// Every backend must honor the same contract:
/// - Slugs are unique; a duplicate yields `SegmentError::Conflict`
/// - Deleting a segment removes every membership that references it
/// - The pair (user, segment) is stored at most once
/// - Multi-segment operations are atomic: they apply fully or not at all
///
/// Segments passed in to membership operations must carry a storage id; a
/// segment without one is treated as absent.
pub trait SegmentRepository: Send + Sync {
    /// Validate and persist a new segment
    ///
    /// The implementation should:
    /// 1. Call `Segment::validate` (normalizes the slug)
    /// 2. Reject a slug that already exists
    /// 3. Assign a new unique id and return the populated segment
    ///
    /// # Errors
    ///
    /// - `SegmentError::Validation` if the slug is invalid
    /// - `SegmentError::Conflict` if the normalized slug already exists
    /// - `SegmentError::Storage` on backend failure
    fn create(
        &self,
        segment: Segment,
    ) -> impl Future<Output = Result<Segment, SegmentError>> + Send;

    /// Find a segment by exact match against the stored normalized slug
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::NotFound` if no segment has this slug
    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Segment, SegmentError>> + Send;

    /// Delete a segment by id, cascading to its memberships
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::NotFound` if the segment id is not in storage
    fn delete(&self, segment: &Segment) -> impl Future<Output = Result<(), SegmentError>> + Send;

    /// Link a user to every segment in the list
    ///
    /// Existing memberships are left as they are. An empty list succeeds trivially.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::NotFound` for the first segment whose id is not in
    /// storage; no membership from this call is kept in that case.
    fn add_user_to_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send;

    /// Unlink a user from every segment in the list
    ///
    /// A missing membership is silently ignored. An empty list succeeds trivially.
    fn delete_user_from_segments(
        &self,
        user_id: UserId,
        segments: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send;

    /// Apply removals and then additions for one user as a single atomic unit
    ///
    /// Segment ids in `add` are re-validated inside the unit. A segment present in
    /// both lists ends up linked.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::NotFound` if any segment in `add` is not in storage;
    /// neither the removals nor the additions are applied in that case.
    fn apply_user_segments(
        &self,
        user_id: UserId,
        remove: &[Segment],
        add: &[Segment],
    ) -> impl Future<Output = Result<(), SegmentError>> + Send;

    /// Return every segment linked to the user, ordered by id
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::NotFound` if the user has no segments. Users are not
    /// modelled, so an unknown user and a user with zero segments are the same.
    fn find_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Segment>, SegmentError>> + Send;
}
