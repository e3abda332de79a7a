//! Binding errors.

use thiserror::Error;
use trilin_core::TrilinearError;

/// Error raised while binding or running a registered entry point.
#[derive(Error, Debug)]
pub enum BindingError {
    /// Error returned by the operator itself, unchanged.
    #[error(transparent)]
    Operator(#[from] TrilinearError),

    /// No entry point registered under this name.
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Too many positional arguments.
    #[error("{operator}() takes {expected} arguments but {actual} were given")]
    Arity {
        operator: String,
        expected: usize,
        actual: usize,
    },

    /// Keyword that names no parameter.
    #[error("{operator}() got an unexpected keyword argument `{keyword}`")]
    UnexpectedKeyword { operator: String, keyword: String },

    /// Parameter bound twice.
    #[error("{operator}() got multiple values for argument `{argument}`")]
    DuplicateArgument { operator: String, argument: String },

    /// Parameter left unbound.
    #[error("{operator}() missing required argument `{argument}`")]
    MissingArgument { operator: String, argument: String },
}

/// Result type for binding operations.
pub type Result<T> = std::result::Result<T, BindingError>;

impl BindingError {
    /// The wrapped operator error, if any.
    pub fn operator_error(&self) -> Option<&TrilinearError> {
        match self {
            Self::Operator(err) => Some(err),
            _ => None,
        }
    }
}
