use thiserror::Error;

use crate::field_value::ScalarKind;

/// Errors produced by value conversions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    /// The value has no representation in the document's scalar model.
    #[error("value cannot be represented in a document: {0}")]
    UnrepresentableValue(String),

    /// A stored scalar does not match the kind the field declares.
    #[error("expected {expected} value, found {found}")]
    KindMismatch {
        expected: ScalarKind,
        found: &'static str,
    },

    /// Text could not be parsed into the declared kind.
    #[error("invalid {kind} text {text:?}: {reason}")]
    InvalidText {
        kind: ScalarKind,
        text: String,
        reason: String,
    },

    /// JSON input does not describe a document.
    #[error("invalid JSON document: {0}")]
    InvalidJson(String),
}

/// Result alias for value conversions.
pub type TypeResult<T> = Result<T, TypeError>;
