//! Dialect-specific fault envelopes

use fakeaws_query::Dialect;
use http::StatusCode;

use crate::error::ErrorResponse;

/// Rendered in place of a missing or empty error code
pub const MISSING_CODE: &str = "[fakeaws missing error code]";
/// Rendered in place of a missing or empty error message
pub const MISSING_MESSAGE: &str = "[fakeaws missing error message]";

/// Which of the two on-wire fault layouts to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultShape {
    /// `<ErrorResponse><Error>...</Error><RequestId/></ErrorResponse>`
    Query,
    /// `<Response><Errors><Error>...</Error></Errors><RequestId/></Response>`
    Ec2,
}

/// A domain error shaped for the dialect of the action that raised it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub shape: FaultShape,
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub status: StatusCode,
}

impl Fault {
    pub fn specialize(error: &ErrorResponse, dialect: Dialect) -> Self {
        let shape = if dialect.is_ec2() {
            FaultShape::Ec2
        } else {
            FaultShape::Query
        };
        Self {
            shape,
            code: or_sentinel(error.code.as_deref(), MISSING_CODE),
            message: or_sentinel(error.message.as_deref(), MISSING_MESSAGE),
            request_id: String::new(),
            status: error.status,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

fn or_sentinel(value: Option<&str>, sentinel: &str) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => sentinel.to_string(),
    }
}
