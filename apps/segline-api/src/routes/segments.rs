//! Segment routes

use axum::{routing::post, Router};

use crate::{
    handlers::segments::{
        create_segment_handler, delete_segment_handler, get_user_segments_handler,
        update_user_segments_handler,
    },
    AppState,
};

/// Create segment routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/seg",
        post(create_segment_handler)
            .delete(delete_segment_handler)
            .put(update_user_segments_handler)
            .get(get_user_segments_handler),
    )
}
