use apikit::ApiError;
use axum::{
    body::Body,
    http::{header, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Unmatched routes answer with the standard failed envelope.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}

/// The timeout and body-limit layers answer 408/413 with a bare body;
/// rewrite those into the failed envelope. JSON bodies pass through.
pub async fn envelope_bare_errors(req: Request<Body>, next: Next) -> Response {
    let resp = next.run(req).await;
    let err = match resp.status() {
        StatusCode::REQUEST_TIMEOUT => ApiError::RequestTimeout,
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large("request body is too large"),
        _ => return resp,
    };
    let is_json = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        return resp;
    }
    err.into_response()
}
