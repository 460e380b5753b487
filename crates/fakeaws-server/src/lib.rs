//! # Fake AWS Query Server
//!
//! Test doubles for AWS services that speak the query protocol
//! (CloudFormation, IAM, SQS, EC2, ...). A backend implements only the
//! actions the code under test calls; this crate decodes requests into the
//! backend's typed inputs and renders outputs and errors the way the real
//! service would.
//!
//! ## Features
//! - Action registry built once from one or more [`Backend`]s
//! - Dialect-correct decoding and fault envelopes (query and EC2)
//! - Pluggable XML rendering via [`XmlSerializer`]
//! - A hyper-based HTTP transport with an ephemeral-port mode for tests

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fault;
pub mod prelude;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod xml;

#[cfg(test)]
mod tests;

// Re-export main types
pub use backend::{Backend, Operations, Outcome};
pub use config::ServerConfig;
pub use dispatch::{QueryDispatcher, Reply};
pub use error::{ConfigError, DispatchError, ErrorResponse, RegistryError};
pub use fault::{Fault, FaultShape, MISSING_CODE, MISSING_MESSAGE};
pub use protocol::{Protocol, ProtocolMap};
pub use registry::{Action, ActionRegistry, ActionRegistryBuilder};
pub use server::{FakeServer, FakeServerBuilder, RunningServer};
pub use xml::{XmlSerializer, XmlWriter};

// Re-export the codec
pub use fakeaws_query;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors from building or running a fake server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}
