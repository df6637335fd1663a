//! Defines the top level configuration for the attestor.
use std::{fs, net::SocketAddr, path::Path};

use oracle_keys::PublicKey;
use serde::Deserialize;
use thiserror::Error;

use crate::{attestation_payload::NetworkMode, verifier::events::DEFAULT_EVENT_CAPACITY};

/// The top level configuration for the attestor.
#[derive(Clone, Debug, Deserialize)]
pub struct AttestorConfig<P, S> {
    /// The configuration for the attestor server.
    pub server: ServerConfig,
    /// Network the attestations are bound to.
    #[serde(default)]
    pub network: NetworkMode,
    /// Signer configuration, see [crate::signer::local::LocalSignerConfig]
    pub signer: S,
    /// Price source specific configuration
    pub price_source: P,
    /// Verifier configuration
    #[serde(default)]
    pub verifier: VerifierConfig,
}

impl<P, S> AttestorConfig<P, S>
where
    P: for<'de> Deserialize<'de>,
    S: for<'de> Deserialize<'de>,
{
    /// Load an `AttestorConfig` from a TOML file on disk.
    ///
    /// Accepts any `T: AsRef<Path>` (e.g. &str, String, Path, PathBuf).
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .map_err(|e| ConfigError::Io(path_ref.display().to_string(), e))?;
        let cfg = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

/// The configuration for the attestor server.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// The address that the server should listen on.
    pub listen_addr: SocketAddr,
    /// The address that the health check server should listen on.
    /// Defaults to port 8081 on the same host as listen_addr if not specified.
    #[serde(default)]
    pub health_addr: Option<SocketAddr>,
}

impl ServerConfig {
    /// Resolved health check address.
    pub fn health_addr(&self) -> SocketAddr {
        self.health_addr.unwrap_or_else(|| {
            let mut addr = self.listen_addr;
            addr.set_port(8081);
            addr
        })
    }
}

const fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

/// Settings for the verifier side of the service.
#[derive(Clone, Debug, Deserialize)]
pub struct VerifierConfig {
    /// Key bound into the registry at startup. Defaults to the signer's own key.
    #[serde(default)]
    pub trusted_public_key: Option<PublicKey>,
    /// Number of verified prices kept for `/api/events`; older ones are evicted.
    /// Also sizes the broadcast buffer of event subscribers.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            trusted_public_key: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Errors that can occur loading the attestor config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing or invalid file paths
    #[error("I/O error reading `{0}`: {1}")]
    Io(String, #[source] std::io::Error),

    /// Malformed toml
    #[error("invalid TOML in config: {0}")]
    Toml(#[from] toml::de::Error),
}
