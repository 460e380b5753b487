use std::num::{ParseFloatError, ParseIntError};
use std::string::FromUtf8Error;
use std::str::Utf8Error;

use thiserror::Error;

use crate::shape::Category;

/// Malformed form body
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("request body is not valid UTF-8: {0}")]
    Body(#[from] Utf8Error),

    #[error("invalid percent escape in {fragment:?}")]
    Escape { fragment: String },

    #[error("invalid semicolon separator in {pair:?}")]
    Semicolon { pair: String },

    #[error("percent-decoded value is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Why a raw scalar could not be parsed
#[derive(Debug, Error)]
pub enum ScalarError {
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error("invalid boolean token")]
    Boolean,

    #[error(transparent)]
    Integer(#[from] ParseIntError),

    #[error(transparent)]
    Float(#[from] ParseFloatError),

    #[error(transparent)]
    Timestamp(#[from] chrono::ParseError),
}

/// A scalar at `field` could not be parsed; the whole decode is abandoned
#[derive(Debug, Error)]
#[error("error parsing field {field:?} value {value:?}: {source}")]
pub struct DecodeError {
    pub field: String,
    pub value: String,
    #[source]
    pub source: ScalarError,
}

impl DecodeError {
    pub fn new(field: impl Into<String>, value: impl Into<String>, source: impl Into<ScalarError>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            source: source.into(),
        }
    }
}

/// A value did not match the shape it was encoded against
#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("expected {expected} at {path:?}, found {found}")]
    Mismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Conversion between a [`Value`](crate::Value) tree and a Rust type failed
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("expected {expected} at {path:?}, found {found}")]
    Mismatch {
        path: String,
        expected: Category,
        found: &'static str,
    },

    #[error("integer {value} out of range for {target} at {path:?}")]
    OutOfRange {
        path: String,
        value: i64,
        target: &'static str,
    },
}

impl ShapeError {
    pub fn mismatch(expected: Category, found: &'static str) -> Self {
        ShapeError::Mismatch {
            path: String::new(),
            expected,
            found,
        }
    }

    /// Prefix the error path with an enclosing member name or index
    pub fn within(self, segment: &str) -> Self {
        let prepend = |path: String| {
            if path.is_empty() {
                segment.to_string()
            } else {
                format!("{segment}.{path}")
            }
        };
        match self {
            ShapeError::Mismatch {
                path,
                expected,
                found,
            } => ShapeError::Mismatch {
                path: prepend(path),
                expected,
                found,
            },
            ShapeError::OutOfRange {
                path,
                value,
                target,
            } => ShapeError::OutOfRange {
                path: prepend(path),
                value,
                target,
            },
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ShapeError::Mismatch { path, .. } | ShapeError::OutOfRange { path, .. } => path,
        }
    }
}

/// Any failure of the typed `decode`/`encode` helpers
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
