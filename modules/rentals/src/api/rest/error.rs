use apikit::ApiError;
use listing_query::QueryError;

use crate::domain::error::DomainError;

fn query_message(e: &QueryError) -> String {
    match e {
        QueryError::UnknownField(f) => format!("unknown filter field '{f}'"),
        QueryError::NotFilterable(f) => format!("field '{f}' cannot be used as a filter"),
        QueryError::DuplicateField(f) => format!("filter '{f}' given more than once"),
        QueryError::InvalidValue {
            field,
            value,
            expected,
        } => format!("invalid value '{value}' for '{field}': expected {expected}"),
        QueryError::UnknownSortField(f) => format!("cannot sort by '{f}'"),
        QueryError::InvalidPagination { param, value } => {
            format!("'{param}' must be an integer, got '{value}'")
        }
    }
}

/// Domain error → HTTP error envelope. Storage failures become a generic
/// 500; their details only reach the log.
pub fn map_domain_error(e: &DomainError) -> ApiError {
    match e {
        DomainError::UserNotFound { .. } => ApiError::not_found("No user found with that id"),
        DomainError::FlatNotFound { .. } => ApiError::not_found("No flat found with that id"),
        DomainError::EmailAlreadyExists { email } => {
            ApiError::conflict(format!("Email '{email}' is already in use"))
        }
        DomainError::InvalidCredentials
        | DomainError::Unauthenticated { .. } => ApiError::unauthorized(e.to_string()),
        DomainError::Forbidden { .. } => ApiError::forbidden(e.to_string()),
        DomainError::InvalidResetToken => ApiError::bad_request(e.to_string()),
        DomainError::Validation { field, message } => {
            ApiError::bad_request(format!("{field}: {message}"))
        }
        DomainError::InvalidQuery(q) => ApiError::bad_request(query_message(q)),
        DomainError::Database { .. } | DomainError::Internal { .. } => {
            ApiError::internal(anyhow::anyhow!(e.to_string()))
        }
    }
}
