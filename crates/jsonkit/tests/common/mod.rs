#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use jsonkit::{CodecConfig, JsonCodec, JsonResponse, StrictJson};

/// Decode target used throughout the tests: a single string field `foo`.
///
/// `foo` defaults to an empty string so the tolerant-mode cases can omit it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Foo {
    #[serde(default)]
    pub foo: String,
}

/// Codec with the given cap and unknown-field policy.
pub fn codec(max_body_size: usize, allow_unknown_fields: bool) -> JsonCodec {
    JsonCodec::new(
        CodecConfig::default()
            .with_max_body_size(max_body_size)
            .with_allow_unknown_fields(allow_unknown_fields),
    )
}

async fn create_foo(StrictJson(input): StrictJson<Foo>) -> impl IntoResponse {
    JsonResponse::new(StatusCode::CREATED, input)
}

/// Router with a single `POST /foo` route that echoes the decoded body.
pub fn build_test_app(codec: JsonCodec) -> Router {
    Router::new()
        .route("/foo", post(create_foo))
        .layer(TraceLayer::new_for_http())
        .with_state(codec)
}

/// Send a `POST` with the given raw body.
pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
