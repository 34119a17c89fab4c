use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::request_id;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failed request renders as `{"status":"failed","code":...,"message":...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("request timed out")]
    RequestTimeout,
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::RequestTimeout => "request_timeout",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status: &'static str,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = request_id::current();
        let rid = request_id.as_deref().unwrap_or("n/a");

        // the cause of an internal error stays in the logs
        let message = match &self {
            Self::Internal(err) => {
                tracing::error!(
                    request_id = %rid,
                    error = ?err,
                    status = status.as_u16(),
                    "request failed"
                );
                "internal error".to_owned()
            }
            other => {
                tracing::warn!(
                    request_id = %rid,
                    error = %other,
                    status = status.as_u16(),
                    "request failed"
                );
                other.to_string()
            }
        };

        let body = ErrorBody {
            status: "failed",
            code: self.code(),
            message: &message,
            request_id,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn client_errors_render_their_message() {
        let resp = ApiError::not_found("flat not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "failed");
        assert_eq!(body["code"], "not_found");
        assert_eq!(body["message"], "flat not found");
        assert!(body.get("requestId").is_none());
    }

    #[tokio::test]
    async fn internal_errors_hide_the_cause() {
        let resp = ApiError::internal(anyhow::anyhow!("disk on fire")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "internal error");
        assert!(!body.to_string().contains("disk"));
    }

    #[tokio::test]
    async fn transport_limits_use_their_own_codes() {
        let resp = ApiError::RequestTimeout.into_response();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body_json(resp).await["code"], "request_timeout");

        let resp = ApiError::payload_too_large("too big").into_response();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(resp).await;
        assert_eq!(body["code"], "payload_too_large");
        assert_eq!(body["message"], "too big");
    }

    #[tokio::test]
    async fn request_id_is_echoed_inside_scope() {
        let resp = request_id::scope("req-42".into(), async {
            ApiError::forbidden("admins only").into_response()
        })
        .await;
        let body = body_json(resp).await;
        assert_eq!(body["requestId"], "req-42");
    }
}
