//! # Fake Server Prelude
//!
//! ```rust
//! use fakeaws_server::prelude::*;
//! ```

pub use crate::backend::{Backend, Operations};
pub use crate::config::ServerConfig;
pub use crate::dispatch::QueryDispatcher;
pub use crate::error::ErrorResponse;
pub use crate::protocol::{Protocol, ProtocolMap};
pub use crate::registry::ActionRegistry;
pub use crate::server::FakeServer;
pub use fakeaws_query::QueryShape;
pub use http::StatusCode;
