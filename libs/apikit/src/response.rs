use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

const SUCCESS: &str = "success";

/// `{"status":"success", "token"?, "data"}`
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: SUCCESS,
            token: None,
            data,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Envelope of a paginated listing. `count` is the size of this page,
/// `totalCount` the number of matches before windowing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub status: &'static str,
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(page: u64, limit: u64, total_count: u64, data: Vec<T>) -> Self {
        Self {
            status: SUCCESS,
            page,
            limit,
            total_count,
            count: data.len(),
            data,
        }
    }
}

/// Plain list without paging metadata, e.g. a thread of messages.
#[derive(Debug, Clone, Serialize)]
pub struct ItemsResponse<T> {
    pub status: &'static str,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for ItemsResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            status: SUCCESS,
            count: data.len(),
            data,
        }
    }
}

/// 201 Created + JSON
pub fn created_json<T: Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

/// 204 No Content
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_envelope_uses_camel_case_and_counts_items() {
        let v = serde_json::to_value(ListResponse::new(2, 10, 31, vec![1, 2, 3])).unwrap();
        assert_eq!(
            v,
            json!({
                "status": "success",
                "page": 2,
                "limit": 10,
                "totalCount": 31,
                "count": 3,
                "data": [1, 2, 3]
            })
        );
    }

    #[test]
    fn token_is_omitted_unless_set() {
        let plain = serde_json::to_value(DataResponse::new("x")).unwrap();
        assert!(plain.get("token").is_none());
        let with = serde_json::to_value(DataResponse::new("x").with_token("t")).unwrap();
        assert_eq!(with["token"], "t");
    }
}
