//! Shared HTTP surface for REST modules: the error taxonomy, the
//! `{status: ...}` JSON envelopes and request-scoped context.

pub mod error;
pub mod extract;
pub mod request_id;
pub mod response;

pub use error::{ApiError, ApiResult};
pub use extract::{ApiJson, QueryPairs};
pub use response::{created_json, no_content, DataResponse, ItemsResponse, ListResponse};
