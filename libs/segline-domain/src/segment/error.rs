//! Domain errors for segment and membership operations
//!
//! Storage adapters classify only the conditions they can distinguish
//! (missing rows, duplicate slugs); everything else is an opaque
//! `SegmentError::Storage`.

use thiserror::Error;

/// Errors that can occur while managing segments and memberships
///
/// These errors are independent of the storage backend: no SQL or driver error
/// types leak through here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// A segment field failed validation
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Unknown segment, slug, or empty user-segment set
    #[error("record not found: {0}")]
    NotFound(String),

    /// A segment with the same normalized slug already exists
    #[error("segment {0} already exists")]
    Conflict(String),

    /// Backend failure, connectivity, or unclassified constraint violation
    #[error("storage operation failed: {0}")]
    Storage(String),
}

impl SegmentError {
    /// Create a validation error for the given field
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Create a not found error with a message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error for the given slug
    pub fn conflict(slug: impl Into<String>) -> Self {
        Self::Conflict(slug.into())
    }

    /// Create a storage failure error with a message
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Result type alias for segment operations
pub type Result<T> = std::result::Result<T, SegmentError>;
