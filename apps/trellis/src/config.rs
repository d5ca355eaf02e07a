//! # Application Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults (`memory` endpoint, `127.0.0.1:8080`)
//! 2. Optional TOML file (`--config`)
//! 3. Environment: `TRELLIS_ENDPOINT`, `TRELLIS_USERNAME`, `TRELLIS_PASSWORD`
//! 4. Command-line flags
//!
//! ```toml
//! [store]
//! endpoint = "redb:trellis.redb"
//! username = "neo4j"
//! password = "secret"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! ```

use serde::Deserialize;
use std::path::Path;
use trellis_core::{Credentials, Endpoint, StoreConfig, StoreError};

pub const ENV_ENDPOINT: &str = "TRELLIS_ENDPOINT";
pub const ENV_USERNAME: &str = "TRELLIS_USERNAME";
pub const ENV_PASSWORD: &str = "TRELLIS_PASSWORD";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// FILE FORMAT
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl FileConfig {
    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::parse(&contents)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(contents: &str) -> Result<Self, StoreError> {
        toml::from_str(contents).map_err(|e| StoreError::Config(e.to_string()))
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Raw settings before validation; every layer overwrites what it sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Settings {
    /// Apply the file layer.
    pub fn with_file(mut self, file: FileConfig) -> Self {
        self.endpoint = file.store.endpoint.or(self.endpoint);
        self.username = file.store.username.or(self.username);
        self.password = file.store.password.or(self.password);
        self.host = file.server.host.or(self.host);
        self.port = file.server.port.or(self.port);
        self
    }

    /// Apply the environment layer through a lookup function.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        self.endpoint = non_empty(ENV_ENDPOINT).or(self.endpoint);
        self.username = non_empty(ENV_USERNAME).or(self.username);
        self.password = non_empty(ENV_PASSWORD).or(self.password);
        self
    }

    /// Apply the command-line layer.
    pub fn with_flags(
        mut self,
        endpoint: Option<String>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Self {
        self.endpoint = endpoint.or(self.endpoint);
        self.host = host.or(self.host);
        self.port = port.or(self.port);
        self
    }

    /// Build the store configuration.
    ///
    /// A username without a password (or the reverse) is rejected.
    pub fn store_config(&self) -> Result<StoreConfig, StoreError> {
        let endpoint: Endpoint = match &self.endpoint {
            Some(raw) => raw.parse()?,
            None => Endpoint::Memory,
        };
        let config = StoreConfig::new(endpoint);
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                Ok(config.with_credentials(Credentials::new(username, password)))
            }
            (None, None) => Ok(config),
            _ => Err(StoreError::Config(
                "username and password must be given together".to_string(),
            )),
        }
    }

    /// `host:port` to bind the server to.
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT)
        )
    }
}

/// Resolve file and environment layers for a run.
pub fn resolve(config_path: Option<&Path>) -> Result<Settings, StoreError> {
    let mut settings = Settings::default();
    if let Some(path) = config_path {
        settings = settings.with_file(FileConfig::load(path)?);
    }
    Ok(settings.with_env(|key| std::env::var(key).ok()))
}

// =============================================================================
// TESTS
// =============================================================================
