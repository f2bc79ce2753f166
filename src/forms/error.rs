//! Errors raised when a form is driven with a field it does not have

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Cannot descend into '{segment}' of '{path}': not a group")]
    NotAGroup { path: String, segment: String },

    #[error("Invalid field path: '{0}'")]
    InvalidPath(String),
}
