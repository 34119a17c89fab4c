use thiserror::Error;

/// Rejections raised while turning query parameters into a [`crate::ListQuery`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown filter field: {0}")]
    UnknownField(String),

    #[error("field cannot be filtered: {0}")]
    NotFilterable(String),

    #[error("filter field given more than once: {0}")]
    DuplicateField(String),

    #[error("invalid value '{value}' for {field}: expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("invalid {param}: '{value}' is not an integer")]
    InvalidPagination { param: &'static str, value: String },
}
