//! TOML schema for the console settings file.
//!
//! ```toml
//! host = "192.168.1.40"
//! port = 3000
//! reconnect-delay-ms = 3000
//! log-retention = 500
//! request-timeout-secs = 10
//! editor = "nvim"
//! username = "operator"
//! password = "secret"
//! ```
//!
//! Every key is optional; unset keys fall through to the next source.

use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;
pub const DEFAULT_LOG_RETENTION: usize = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Shortest reconnect delay accepted, in milliseconds.
pub const MIN_RECONNECT_DELAY_MS: u64 = 100;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SettingsFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub reconnect_delay_ms: Option<u64>,
    pub log_retention: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub editor: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SettingsFile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a settings file; a missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Basic-auth credentials presented on HTTP requests and the WebSocket upgrade.
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

    /// Value for an `Authorization` header.
    pub fn authorization_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
