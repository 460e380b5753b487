//! Server configuration

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::protocol::{Protocol, ProtocolMap};

/// Configuration for the fake server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind to; port 0 picks a free port
    pub bind_address: SocketAddr,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Service -> protocol entries applied over the built-in table
    pub protocols: BTreeMap<String, Protocol>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            max_body_size: 1024 * 1024, // 1MB
            protocols: BTreeMap::new(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// The built-in protocol table with this config's overrides applied
    pub fn protocol_map(&self) -> ProtocolMap {
        ProtocolMap::default().extend(
            self.protocols
                .iter()
                .map(|(service, protocol)| (service.clone(), *protocol)),
        )
    }
}
