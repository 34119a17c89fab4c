//! Error and success envelopes rendered through a real router.

use apikit::{ApiError, ApiJson, ApiResult, DataResponse, QueryPairs};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower::ServiceExt;

#[derive(Deserialize)]
struct Greet {
    name: String,
}

async fn greet(ApiJson(req): ApiJson<Greet>) -> ApiResult<Json<DataResponse<String>>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    Ok(Json(DataResponse::new(format!("hello {}", req.name))))
}

async fn echo(q: QueryPairs) -> Json<Vec<(String, String)>> {
    Json(q.0)
}

fn app() -> Router {
    Router::new()
        .route("/greet", post(greet))
        .route("/echo", get(echo))
}

async fn call(req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/greet")
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn malformed_json_is_a_failed_400() {
    let (status, body) = call(post_json("{\"name\":")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn handler_errors_and_success_share_the_status_field() {
    let (status, body) = call(post_json("{\"name\":\" \"}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");

    let (status, body) = call(post_json("{\"name\":\"ana\"}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], "hello ana");
}

#[tokio::test]
async fn query_pairs_extractor_sees_raw_pairs() {
    let req = Request::builder()
        .uri("/echo?rentPrice=300-600&sort=-rentPrice")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([["rentPrice", "300-600"], ["sort", "-rentPrice"]])
    );
}
