//! Integration tests for the axum extractor and response types.
//!
//! Requests go through a real `Router` via `tower::ServiceExt::oneshot`.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{body_json, build_test_app, codec, post_raw};
use jsonkit::{DecodeError, JsonRejection, JsonResponse};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: valid body reaches the handler
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_body_is_echoed_with_201() {
    let app = build_test_app(codec(1024, false));
    let response = post_raw(app, "/foo", r#"{"foo":"bar"}"#).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(body_json(response).await, json!({ "foo": "bar" }));
}

// ---------------------------------------------------------------------------
// Test: decode errors become 400 error envelopes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_body_returns_400_envelope() {
    let app = build_test_app(codec(1024, false));
    let response = post_raw(app, "/foo", r#"{"foo"}"#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(
        json["message"],
        "body contains badly-formed JSON (at character 6)"
    );
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn unknown_key_returns_400_when_strict() {
    let app = build_test_app(codec(1024, false));
    let response = post_raw(app, "/foo", r#"{"fooo":"bazz"}"#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "body contains unknown key \"fooo\"");
}

#[tokio::test]
async fn unknown_key_is_accepted_when_tolerant() {
    let app = build_test_app(codec(1024, true));
    let response = post_raw(app, "/foo", r#"{"fooo":"bazz"}"#).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await, json!({ "foo": "" }));
}

#[tokio::test]
async fn empty_body_returns_400() {
    let app = build_test_app(codec(1024, false));
    let response = post_raw(app, "/foo", "").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "body must not be empty");
}

// ---------------------------------------------------------------------------
// Test: oversized bodies become 413
// ---------------------------------------------------------------------------

#[tokio::test]
async fn body_over_limit_returns_413() {
    let app = build_test_app(codec(4, true));
    let response = post_raw(app, "/foo", r#"{"foo":"bar"}"#).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["message"], "body must not be larger than 4 bytes");
}

#[tokio::test]
async fn body_one_byte_over_limit_returns_413() {
    let body = r#"{"foo":"bar"}"#;
    let app = build_test_app(codec(body.len() - 1, false));
    let response = post_raw(app, "/foo", body).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ---------------------------------------------------------------------------
// Test: rejection status mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_decode_target_is_a_sanitized_500() {
    let rejection = JsonRejection::from(DecodeError::InvalidDecodeTarget(
        "no value at JSON pointer \"/secret\"".into(),
    ));
    assert_eq!(rejection.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["message"], "An internal error occurred");
    assert!(!json.to_string().contains("secret"));
}

#[test]
fn data_errors_map_to_400() {
    for err in [
        DecodeError::MalformedSyntax { offset: 0 },
        DecodeError::UnexpectedEof,
        DecodeError::EmptyBody,
        DecodeError::MultipleValues,
        DecodeError::UnknownKey("x".into()),
        DecodeError::Other("x".into()),
    ] {
        assert_eq!(JsonRejection::from(err).status(), StatusCode::BAD_REQUEST);
    }
}

// ---------------------------------------------------------------------------
// Test: JsonResponse
// ---------------------------------------------------------------------------

#[tokio::test]
async fn json_response_applies_headers_and_status() {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert("x-request-id", "abc".parse().unwrap());

    let response = JsonResponse::new(StatusCode::ACCEPTED, json!({ "queued": 3 }))
        .with_headers(headers)
        .into_response();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(response.headers()["x-request-id"], "abc");
    assert_eq!(body_json(response).await, json!({ "queued": 3 }));
}

#[tokio::test]
async fn json_response_serialization_failure_is_500() {
    let mut data = std::collections::BTreeMap::new();
    data.insert((1u8, 2u8), "x");

    let response = JsonResponse::ok(data).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], true);
}
