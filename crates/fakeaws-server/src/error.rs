//! Error types for registry construction and request dispatch
//!
//! [`ErrorResponse`] is the only error a backend returns; it is rendered into
//! a fault envelope. The other types describe integration mistakes and are
//! reported to the transport instead.

use std::fmt;

use fakeaws_query::{DecodeError, EncodeError, ParseError, ShapeError};
use http::StatusCode;
use thiserror::Error;

use crate::protocol::Protocol;

/// A domain error returned by a backend action.
///
/// The code and message are rendered into the dialect's fault envelope and
/// the response carries `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub status: StatusCode,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(message.into()),
            status,
        }
    }

    /// 400 with the given code and message
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusCode::BAD_REQUEST)
    }

    /// An error carrying only a status; code and message render as placeholders
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            code: None,
            message: None,
            status,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.status.as_u16(),
            self.code.as_deref().unwrap_or("<no code>"),
            self.message.as_deref().unwrap_or("<no message>")
        )
    }
}

impl std::error::Error for ErrorResponse {}

/// A request could not be routed to a backend or its result could not be rendered
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unable to parse request body as query syntax: {0}")]
    Parse(#[from] ParseError),

    #[error("request has no Action parameter")]
    MissingAction,

    #[error("action {action} not found, check that the fake backend implements it")]
    UnknownAction { action: String },

    #[error("failed to decode input for {action}: {source}")]
    Decode {
        action: String,
        #[source]
        source: DecodeError,
    },

    #[error("input for {action} does not fit its type: {source}")]
    Input {
        action: String,
        #[source]
        source: ShapeError,
    },

    #[error("failed to render output of {action}: {source}")]
    Render {
        action: String,
        #[source]
        source: EncodeError,
    },
}

impl DispatchError {
    /// HTTP status the transport reports for this failure
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Parse(_) | DispatchError::MissingAction => StatusCode::BAD_REQUEST,
            DispatchError::UnknownAction { .. } => StatusCode::NOT_IMPLEMENTED,
            DispatchError::Decode { .. } | DispatchError::Input { .. } => StatusCode::BAD_REQUEST,
            DispatchError::Render { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The registry could not be built from the given backends
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no backends registered")]
    NoBackends,

    #[error("backend for service {service:?} registers no operations")]
    NoOperations { service: String },

    #[error("service {service:?} is not in the protocol table")]
    UnknownService { service: String },

    #[error("service {service:?} uses the {protocol} protocol, which is not supported")]
    UnsupportedProtocol { service: String, protocol: Protocol },

    #[error("action {action} is registered by both {first:?} and {second:?}")]
    DuplicateAction {
        action: String,
        first: String,
        second: String,
    },
}

/// Configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
