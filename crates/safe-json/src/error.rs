//! Error and kind types.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Runtime kind of a JSON node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl Kind {
    /// Kind of the given value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Kind::Object,
            Value::Array(_) => Kind::Array,
            Value::String(_) => Kind::String,
            Value::Number(_) => Kind::Number,
            Value::Bool(_) => Kind::Bool,
            Value::Null => Kind::Null,
        }
    }

    /// Lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Bool => "bool",
            Kind::Null => "null",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum JsonError {
    /// Input bytes or stream were not valid JSON.
    #[error("parse failed: {0}")]
    Parse(#[source] serde_json::Error),
    /// The node could not be serialized.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
    /// A strict accessor or a mutation found a node of another kind.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: Kind,
    },
}

impl JsonError {
    pub(crate) fn mismatch(expected: &'static str, value: &Value) -> Self {
        JsonError::TypeMismatch {
            expected,
            actual: Kind::of(value),
        }
    }

    /// Returns `true` for [`JsonError::TypeMismatch`].
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, JsonError::TypeMismatch { .. })
    }
}

pub type JsonResult<T> = Result<T, JsonError>;
