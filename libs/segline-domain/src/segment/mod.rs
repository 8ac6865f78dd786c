//! Segment domain module
//!
//! This module contains the core business logic and entities for segments and
//! user memberships. It defines what a valid Segment is and how membership
//! changes flow through the storage port.

mod entity;
mod error;
mod ids;
mod service;

pub use entity::{normalize_slug, Segment, MAX_SLUG_LEN};
pub use error::{Result, SegmentError};
pub use ids::{SegmentId, UserId};
pub use service::{MembershipUpdate, SegmentService};
