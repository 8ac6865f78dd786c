//! Domain entities for user segmentation
//!
//! A Segment is a named cohort that users can be linked to. It is identified by
//! its normalized slug (the business key) and by an integer id that storage
//! assigns on creation.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::{Result, SegmentError};
use super::ids::SegmentId;

/// Maximum length of a normalized slug, in characters
pub const MAX_SLUG_LEN: usize = 50;

fn word_char() -> &'static Regex {
    static WORD_CHAR: OnceLock<Regex> = OnceLock::new();
    WORD_CHAR.get_or_init(|| Regex::new(r"[0-9A-Za-z_]").expect("word-character pattern is valid"))
}

/// Normalize a raw slug: collapse whitespace runs to `_`, then uppercase
///
/// Leading and trailing whitespace is dropped. Applying this twice yields the
/// same result as applying it once.
///
/// ```rust
/// use segline_domain::segment::normalize_slug;
///
/// assert_eq!(normalize_slug("  avito  discount 30 "), "AVITO_DISCOUNT_30");
/// ```
pub fn normalize_slug(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// A Segment represents a named cohort of users
///
/// Segments are:
/// - **Keyed by slug**: the normalized slug is unique across all segments
/// - **Storage-identified**: `id` is unset until a repository persists the segment
/// - **Never mutated** once stored; they are only created and deleted
///
/// # Example
///
/// ```rust
/// use segline_domain::segment::Segment;
///
/// let mut segment = Segment::new("avito discount 30");
/// segment.validate().unwrap();
/// assert_eq!(segment.slug(), "AVITO_DISCOUNT_30");
/// assert!(segment.id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Storage-assigned identifier, `None` before creation
    #[serde(rename = "seg_id")]
    id: Option<SegmentId>,

    /// Business key; normalized by `validate`
    slug: String,
}

impl Segment {
    /// Create an unsaved Segment from a raw, not yet normalized slug
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            id: None,
            slug: slug.into(),
        }
    }

    /// Create a Segment with explicit values (used for reconstruction from storage)
    pub fn from_parts(id: SegmentId, slug: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            slug: slug.into(),
        }
    }

    /// Get the storage-assigned id (if set)
    pub fn id(&self) -> Option<SegmentId> {
        self.id
    }

    /// Get the slug
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Record the id assigned by storage
    ///
    /// Called by repository adapters after a successful insert.
    pub fn set_id(&mut self, id: SegmentId) {
        self.id = Some(id);
    }

    /// Check if this segment has been persisted to storage
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Normalize the slug in place and check it against the segment rules
    ///
    /// Rules, checked in order on the normalized slug: it is non-empty, it contains
    /// at least one word character, and it is at most `MAX_SLUG_LEN` characters.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::Validation` naming the `slug` field on the first
    /// violated rule.
    pub fn validate(&mut self) -> Result<()> {
        self.slug = normalize_slug(&self.slug);

        if self.slug.is_empty() {
            return Err(SegmentError::validation("slug", "cannot be blank"));
        }

        if !word_char().is_match(&self.slug) {
            return Err(SegmentError::validation(
                "slug",
                "must contain at least one word character",
            ));
        }

        let len = self.slug.chars().count();
        if len > MAX_SLUG_LEN {
            return Err(SegmentError::validation(
                "slug",
                format!("the length must be no more than {MAX_SLUG_LEN}, got {len}"),
            ));
        }

        Ok(())
    }
}
