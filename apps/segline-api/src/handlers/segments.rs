//! Segment handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use segline_domain::UserId;
use tracing::info;

use super::{bad_request, error_response};
use crate::{
    dto::segments::{
        CreateSegmentRequest, DeleteSegmentRequest, DeleteSegmentResponse, ErrorResponse,
        SegmentResponse, UpdateUserSegmentsRequest, UpdateUserSegmentsResponse, UserSegmentsQuery,
    },
    AppState,
};

/// Create a segment
#[utoipa::path(
    post,
    path = "/seg",
    request_body = CreateSegmentRequest,
    responses(
        (status = 201, description = "Segment created", body = SegmentResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 409, description = "Conflict - slug already exists", body = ErrorResponse),
        (status = 422, description = "Invalid slug", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "segments"
)]
pub async fn create_segment_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateSegmentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    info!(slug = %payload.slug, "Received create segment request");

    match state.segment_service.create_segment(&payload.slug).await {
        Ok(segment) => {
            info!(seg_id = ?segment.id(), slug = %segment.slug(), "Created segment");
            (StatusCode::CREATED, Json(SegmentResponse::from(segment))).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Delete a segment and every membership referencing it
#[utoipa::path(
    delete,
    path = "/seg",
    request_body = DeleteSegmentRequest,
    responses(
        (status = 200, description = "Segment deleted", body = DeleteSegmentResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "Segment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "segments"
)]
pub async fn delete_segment_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeleteSegmentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    info!(slug = %payload.slug, "Received delete segment request");

    match state.segment_service.delete_by_slug(&payload.slug).await {
        Ok(segment) => {
            info!(seg_id = ?segment.id(), "Deleted segment");
            Json(DeleteSegmentResponse {
                deleted: segment.slug().to_string(),
            })
            .into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Add and remove a user's segments by slug
///
/// Every slug is resolved before any change is made.
#[utoipa::path(
    put,
    path = "/seg",
    request_body = UpdateUserSegmentsRequest,
    responses(
        (status = 200, description = "Memberships updated", body = UpdateUserSegmentsResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "A slug does not name a segment", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "segments"
)]
pub async fn update_user_segments_handler(
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserSegmentsRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    info!(
        user_id = payload.user_id,
        add = payload.slug_list_add.len(),
        del = payload.slug_list_del.len(),
        "Received update user segments request"
    );

    match state
        .segment_service
        .update_user_segments(
            UserId::new(payload.user_id),
            &payload.slug_list_add,
            &payload.slug_list_del,
        )
        .await
    {
        Ok(update) => {
            info!(user_id = %update.user_id, added = ?update.added, removed = ?update.removed, "Updated user segments");
            Json(UpdateUserSegmentsResponse::from(update)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// List the segments a user belongs to
#[utoipa::path(
    get,
    path = "/seg",
    params(UserSegmentsQuery),
    responses(
        (status = 200, description = "Segments of the user", body = [SegmentResponse]),
        (status = 400, description = "Missing or invalid user_id", body = ErrorResponse),
        (status = 404, description = "User has no segments", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "segments"
)]
pub async fn get_user_segments_handler(
    State(state): State<AppState>,
    query: Result<Query<UserSegmentsQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    match state
        .segment_service
        .find_by_user(UserId::new(query.user_id))
        .await
    {
        Ok(segments) => {
            info!(user_id = query.user_id, count = segments.len(), "Listed user segments");
            let body: Vec<SegmentResponse> = segments.into_iter().map(Into::into).collect();
            Json(body).into_response()
        }
        Err(err) => error_response(err),
    }
}
