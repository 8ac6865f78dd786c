//! DTOs for segment endpoints

use segline_domain::{MembershipUpdate, Segment};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request body for segment creation
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSegmentRequest {
    /// Raw slug; whitespace runs become `_` and letters are uppercased
    #[schema(example = "avito discount 30")]
    pub slug: String,
}

/// Request body for segment deletion
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteSegmentRequest {
    /// Stored (normalized) slug of the segment to delete
    #[schema(example = "AVITO_DISCOUNT_30")]
    pub slug: String,
}

/// Request body for changing a user's segments
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserSegmentsRequest {
    /// Slugs to link the user to
    #[serde(default)]
    #[schema(example = json!(["AVITO_VOICE_MESSAGES"]))]
    pub slug_list_add: Vec<String>,
    /// Slugs to unlink the user from
    #[serde(default)]
    #[schema(example = json!(["AVITO_DISCOUNT_30"]))]
    pub slug_list_del: Vec<String>,
    #[schema(example = 1000)]
    pub user_id: i64,
}

/// Query string for listing a user's segments
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSegmentsQuery {
    /// User whose segments to list
    pub user_id: i64,
}

/// A stored segment
#[derive(Debug, Serialize, ToSchema)]
pub struct SegmentResponse {
    #[schema(example = 1)]
    pub seg_id: Option<i64>,
    #[schema(example = "AVITO_DISCOUNT_30")]
    pub slug: String,
}

impl From<Segment> for SegmentResponse {
    fn from(segment: Segment) -> Self {
        Self {
            seg_id: segment.id().map(i64::from),
            slug: segment.slug().to_string(),
        }
    }
}

/// Response body for segment deletion
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteSegmentResponse {
    #[schema(example = "AVITO_DISCOUNT_30")]
    pub deleted: String,
}

/// Response body for a membership update
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateUserSegmentsResponse {
    pub user_id: i64,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl From<MembershipUpdate> for UpdateUserSegmentsResponse {
    fn from(update: MembershipUpdate) -> Self {
        Self {
            user_id: update.user_id.get(),
            added: update.added,
            removed: update.removed,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error description
    #[schema(example = "record not found: segment AVITO_DISCOUNT_50")]
    pub error: String,
}
