use thiserror::Error;

/// Errors produced when constructing values from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("not a regular expression literal: {0}")]
    InvalidRegExp(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Convenience alias for type construction results.
pub type TypeResult<T> = Result<T, TypeError>;
