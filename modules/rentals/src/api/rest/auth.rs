//! Bearer-token extractor.

use std::sync::Arc;

use apikit::ApiError;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::rest::error::map_domain_error;
use crate::domain::service::{Principal, Service};

/// The authenticated caller. Rejects with `401` when the `Authorization:
/// Bearer <token>` header is missing or the token no longer holds.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

fn bearer(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let svc = parts
            .extensions
            .get::<Arc<Service>>()
            .cloned()
            .ok_or_else(|| ApiError::internal(anyhow::anyhow!("rentals service is not installed")))?;
        let token = bearer(parts).ok_or_else(|| {
            ApiError::unauthorized("You are not logged in, please log in to get access")
        })?;
        let principal = svc
            .authenticate(token)
            .await
            .map_err(|e| map_domain_error(&e))?;
        Ok(AuthUser(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(value: Option<&str>) -> Parts {
        let mut req = Request::builder().uri("/");
        if let Some(v) = value {
            req = req.header(AUTHORIZATION, v);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_header_forms() {
        assert_eq!(bearer(&parts(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer(&parts(Some("bearer   abc "))), Some("abc"));
        assert_eq!(bearer(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer(&parts(Some("Bearer "))), None);
        assert_eq!(bearer(&parts(None)), None);
    }
}
