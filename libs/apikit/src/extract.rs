//! Extractors whose rejections render through [`ApiError`].

use std::convert::Infallible;

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::ApiError;

/// `axum::Json` with a `400` failed envelope instead of a plain-text rejection.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Raw query-string pairs in request order, percent-decoded.
///
/// Listing endpoints validate keys against a field schema themselves, so
/// nothing is deserialized here.
#[derive(Debug, Clone, Default)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl QueryPairs {
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_keep_order_and_decode() {
        let q = QueryPairs::parse("city=Alba%20Iulia&sort=-rentPrice&city=x");
        let got: Vec<_> = q.iter().collect();
        assert_eq!(
            got,
            vec![("city", "Alba Iulia"), ("sort", "-rentPrice"), ("city", "x")]
        );
    }

    #[test]
    fn empty_query_yields_no_pairs() {
        assert!(QueryPairs::parse("").0.is_empty());
    }
}
