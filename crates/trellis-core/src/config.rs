//! # Store Configuration
//!
//! Where the store's graph lives, plus optional credentials for remote
//! endpoints. Endpoint strings:
//!
//! - `memory` → volatile in-process graph
//! - `redb:<path>` or a bare filesystem path → redb database file
//! - `http://...` / `https://...` → remote Cypher endpoint (feature `remote`)

use crate::StoreError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Memory,
    Redb(PathBuf),
    Remote(String),
}

impl FromStr for Endpoint {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(StoreError::Config("endpoint must not be empty".to_string()));
        }
        if raw.eq_ignore_ascii_case("memory") {
            return Ok(Self::Memory);
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(Self::Remote(raw.to_string()));
        }
        if let Some(path) = raw.strip_prefix("redb:") {
            if path.is_empty() {
                return Err(StoreError::Config(
                    "redb endpoint needs a path: redb:<path>".to_string(),
                ));
            }
            return Ok(Self::Redb(PathBuf::from(path)));
        }
        if raw.contains("://") {
            return Err(StoreError::Config(format!(
                "unsupported endpoint scheme in '{}'",
                raw
            )));
        }
        Ok(Self::Redb(PathBuf::from(raw)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redb(path) => write!(f, "redb:{}", path.display()),
            Self::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Username/password pair for basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to open a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub endpoint: Endpoint,
    pub credentials: Option<Credentials>,
}

impl StoreConfig {
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            credentials: None,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Endpoint::Memory)
    }
}
