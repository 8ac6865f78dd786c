//! API routes

pub mod segments;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::segments::{
        CreateSegmentRequest, DeleteSegmentRequest, DeleteSegmentResponse, ErrorResponse,
        SegmentResponse, UpdateUserSegmentsRequest, UpdateUserSegmentsResponse,
    },
    handlers, AppState,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::segments::create_segment_handler,
        handlers::segments::delete_segment_handler,
        handlers::segments::update_user_segments_handler,
        handlers::segments::get_user_segments_handler,
        health_handler,
        hello_handler
    ),
    components(
        schemas(
            CreateSegmentRequest,
            DeleteSegmentRequest,
            UpdateUserSegmentsRequest,
            SegmentResponse,
            DeleteSegmentResponse,
            UpdateUserSegmentsResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "segments", description = "Segment and membership endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "Segline API",
        version = "0.1.0",
        description = "Assigns users to named segments and answers membership queries"
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(segments::routes())
        .route("/health", get(health_handler))
        .route("/hello", get(hello_handler))
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}

/// Liveness greeting
#[utoipa::path(
    get,
    path = "/hello",
    responses(
        (status = 200, description = "Greeting")
    ),
    tag = "health"
)]
async fn hello_handler() -> Json<Value> {
    Json(json!({ "test": "hello" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use segline_domain::SegmentService;
    use segline_store::SegmentStore;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState {
            segment_service: Arc::new(SegmentService::new(SegmentStore::in_memory())),
        })
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let body = match body {
            Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
            None => Body::empty(),
        };
        let resp = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create(router: &Router, slug: &str) -> (StatusCode, Value) {
        call(router, "POST", "/seg", Some(json!({ "slug": slug }))).await
    }

    #[tokio::test]
    async fn test_health_and_hello() {
        let router = app();

        let (status, _) = call(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&router, "GET", "/hello", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "test": "hello" }));
    }

    #[tokio::test]
    async fn test_create_segment() {
        let router = app();

        let (status, body) = create(&router, "avito discount 30").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "seg_id": 1, "slug": "AVITO_DISCOUNT_30" }));
    }

    #[tokio::test]
    async fn test_create_segment_errors() {
        let router = app();

        let (status, body) = call(&router, "POST", "/seg", Some(json!(""))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = create(&router, "?#@*&%!").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().starts_with("slug:"));

        create(&router, "AVITO_DISCOUNT_30").await;
        let (status, _) = create(&router, "avito discount 30").await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_segment() {
        let router = app();
        create(&router, "AVITO_DISCOUNT_30").await;

        let (status, body) = call(&router, "DELETE", "/seg", Some(json!({ "slug": "AVITO_DISCOUNT_30" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "deleted": "AVITO_DISCOUNT_30" }));

        let (status, _) = call(&router, "DELETE", "/seg", Some(json!({ "slug": "AVITO_DISCOUNT_30" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&router, "DELETE", "/seg", Some(json!(""))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_list_user_segments() {
        let router = app();
        for slug in ["AVITO_DISCOUNT_30", "AVITO_DISCOUNT_50", "AVITO_VOICE_MESSAGES"] {
            create(&router, slug).await;
        }

        let (status, body) = call(
            &router,
            "PUT",
            "/seg",
            Some(json!({
                "slug_list_add": ["AVITO_DISCOUNT_30", "AVITO_DISCOUNT_50"],
                "slug_list_del": [],
                "user_id": 1000
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "user_id": 1000,
                "added": ["AVITO_DISCOUNT_30", "AVITO_DISCOUNT_50"],
                "removed": []
            })
        );

        let (status, _) = call(
            &router,
            "PUT",
            "/seg",
            Some(json!({
                "slug_list_add": ["AVITO_VOICE_MESSAGES"],
                "slug_list_del": ["AVITO_DISCOUNT_30"],
                "user_id": 1000
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&router, "GET", "/seg?user_id=1000", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "seg_id": 2, "slug": "AVITO_DISCOUNT_50" },
                { "seg_id": 3, "slug": "AVITO_VOICE_MESSAGES" }
            ])
        );
    }

    #[tokio::test]
    async fn test_update_with_unknown_slug_changes_nothing() {
        let router = app();
        create(&router, "AVITO_DISCOUNT_30").await;

        let (status, body) = call(
            &router,
            "PUT",
            "/seg",
            Some(json!({ "slug_list_add": ["X"], "slug_list_del": [], "user_id": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("X"));

        let (status, _) = call(&router, "GET", "/seg?user_id=1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_user_segments_errors() {
        let router = app();

        let (status, _) = call(&router, "GET", "/seg?user_id=7", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&router, "GET", "/seg", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&router, "GET", "/seg?user_id=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_deleting_segment_drops_memberships() {
        let router = app();
        create(&router, "AVITO_DISCOUNT_30").await;
        call(
            &router,
            "PUT",
            "/seg",
            Some(json!({ "slug_list_add": ["AVITO_DISCOUNT_30"], "user_id": 1 })),
        )
        .await;

        call(&router, "DELETE", "/seg", Some(json!({ "slug": "AVITO_DISCOUNT_30" }))).await;

        let (status, _) = call(&router, "GET", "/seg?user_id=1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_openapi_lists_segment_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/seg"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
