//! Precedence resolution for console settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment (`SORTLINE_HOST`, `SORTLINE_PORT`, `SORTLINE_USERNAME`, `SORTLINE_PASSWORD`)
//! 3. Settings file (`--config`, `SORTLINE_CONFIG`, or `~/.config/sortline/config.toml`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::schema::{
    Credentials, DEFAULT_HOST, DEFAULT_LOG_RETENTION, DEFAULT_PORT, DEFAULT_RECONNECT_DELAY_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS, MIN_RECONNECT_DELAY_MS, SettingsFile,
};
use crate::{Error, Result};

pub const HOST_ENV: &str = "SORTLINE_HOST";
pub const PORT_ENV: &str = "SORTLINE_PORT";
pub const USERNAME_ENV: &str = "SORTLINE_USERNAME";
pub const PASSWORD_ENV: &str = "SORTLINE_PASSWORD";
pub const CONFIG_PATH_ENV: &str = "SORTLINE_CONFIG";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from the settings file
    File,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File => write!(f, "file"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config_path: Option<PathBuf>,
}

impl SettingsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }
}

/// Fully resolved console settings with source tracking.
#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    pub host: Resolved<String>,
    pub port: Resolved<u16>,
    pub reconnect_delay_ms: Resolved<u64>,
    pub log_retention: Resolved<usize>,
    pub request_timeout_secs: Resolved<u64>,
    pub editor: Option<Resolved<String>>,
    pub username: Option<Resolved<String>>,
    pub password: Option<Resolved<String>>,
    /// Settings file consulted (may not exist)
    pub config_path: Option<PathBuf>,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            host: Resolved::new(DEFAULT_HOST.to_string(), ValueSource::Default),
            port: Resolved::new(DEFAULT_PORT, ValueSource::Default),
            reconnect_delay_ms: Resolved::new(DEFAULT_RECONNECT_DELAY_MS, ValueSource::Default),
            log_retention: Resolved::new(DEFAULT_LOG_RETENTION, ValueSource::Default),
            request_timeout_secs: Resolved::new(
                DEFAULT_REQUEST_TIMEOUT_SECS,
                ValueSource::Default,
            ),
            editor: None,
            username: None,
            password: None,
            config_path: None,
        }
    }
}

impl ConsoleSettings {
    /// Resolve against the process environment.
    pub fn resolve(overrides: &SettingsOverrides) -> Result<Self> {
        resolve_settings(overrides, |name| std::env::var(name).ok())
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/ws", self.host.value, self.port.value)
    }

    pub fn http_base(&self) -> String {
        format!("http://{}:{}", self.host.value, self.port.value)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms.value)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.value)
    }

    pub fn log_retention(&self) -> usize {
        self.log_retention.value
    }

    /// Credentials are presented only when a username is configured.
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.username.as_ref()?;
        let password = self
            .password
            .as_ref()
            .map(|p| p.value.clone())
            .unwrap_or_default();
        Some(Credentials::new(username.value.clone(), password))
    }

    /// Editor command: configured value, then `$EDITOR`, then `vi`.
    pub fn editor_command(&self) -> String {
        self.editor
            .as_ref()
            .map(|e| e.value.clone())
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if self.port.value == 0 {
            return Err(Error::InvalidInput(format!(
                "port must be non-zero (from {})",
                self.port.source
            )));
        }
        if self.log_retention.value == 0 {
            return Err(Error::InvalidInput(format!(
                "log-retention must be at least 1 (from {})",
                self.log_retention.source
            )));
        }
        if self.reconnect_delay_ms.value < MIN_RECONNECT_DELAY_MS {
            return Err(Error::InvalidInput(format!(
                "reconnect-delay-ms must be at least {} (from {})",
                MIN_RECONNECT_DELAY_MS, self.reconnect_delay_ms.source
            )));
        }
        Ok(())
    }

    /// Summary for `config settings`; the password is masked.
    pub fn report(&self) -> SettingsReport {
        fn entry<T: ToString>(r: &Resolved<T>) -> SettingEntry {
            SettingEntry {
                value: r.value.to_string(),
                source: r.source.to_string(),
            }
        }
        SettingsReport {
            config_path: self
                .config_path
                .as_ref()
                .map(|p| p.display().to_string()),
            host: entry(&self.host),
            port: entry(&self.port),
            reconnect_delay_ms: entry(&self.reconnect_delay_ms),
            log_retention: entry(&self.log_retention),
            request_timeout_secs: entry(&self.request_timeout_secs),
            editor: self.editor.as_ref().map(entry),
            username: self.username.as_ref().map(entry),
            password: self.password.as_ref().map(|p| SettingEntry {
                value: "***".to_string(),
                source: p.source.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingEntry {
    pub value: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsReport {
    pub config_path: Option<String>,
    pub host: SettingEntry,
    pub port: SettingEntry,
    pub reconnect_delay_ms: SettingEntry,
    pub log_retention: SettingEntry,
    pub request_timeout_secs: SettingEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<SettingEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<SettingEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<SettingEntry>,
}

/// Default settings file location (`~/.config/sortline/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sortline").join("config.toml"))
}

/// Resolve settings with full precedence chain.
///
/// `env` looks up an environment variable; injected so resolution can be
/// tested without touching the process environment.
pub fn resolve_settings<F>(overrides: &SettingsOverrides, env: F) -> Result<ConsoleSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let config_path = overrides
        .config_path
        .clone()
        .or_else(|| env(CONFIG_PATH_ENV).map(PathBuf::from))
        .or_else(default_config_path);

    let file = match &config_path {
        Some(path) => load_file(path)?,
        None => SettingsFile::default(),
    };

    let mut result = ConsoleSettings {
        config_path,
        ..ConsoleSettings::default()
    };

    // Resolve host
    if let Some(ref host) = overrides.host {
        result.host = Resolved::new(host.clone(), ValueSource::CliFlag);
    } else if let Some(host) = env(HOST_ENV).filter(|h| !h.is_empty()) {
        result.host = Resolved::new(host, ValueSource::EnvVar(HOST_ENV.to_string()));
    } else if let Some(ref host) = file.host {
        result.host = Resolved::new(host.clone(), ValueSource::File);
    }

    // Resolve port
    if let Some(port) = overrides.port {
        result.port = Resolved::new(port, ValueSource::CliFlag);
    } else if let Some(raw) = env(PORT_ENV).filter(|p| !p.is_empty()) {
        let port = raw
            .trim()
            .parse::<u16>()
            .map_err(|_| Error::InvalidInput(format!("{} is not a valid port: {}", PORT_ENV, raw)))?;
        result.port = Resolved::new(port, ValueSource::EnvVar(PORT_ENV.to_string()));
    } else if let Some(port) = file.port {
        result.port = Resolved::new(port, ValueSource::File);
    }

    // File-only values
    if let Some(delay) = file.reconnect_delay_ms {
        result.reconnect_delay_ms = Resolved::new(delay, ValueSource::File);
    }
    if let Some(retention) = file.log_retention {
        result.log_retention = Resolved::new(retention, ValueSource::File);
    }
    if let Some(timeout) = file.request_timeout_secs {
        result.request_timeout_secs = Resolved::new(timeout, ValueSource::File);
    }
    if let Some(ref editor) = file.editor {
        result.editor = Some(Resolved::new(editor.clone(), ValueSource::File));
    }

    // Credentials
    result.username = env(USERNAME_ENV)
        .filter(|u| !u.is_empty())
        .map(|u| Resolved::new(u, ValueSource::EnvVar(USERNAME_ENV.to_string())))
        .or_else(|| {
            file.username
                .clone()
                .map(|u| Resolved::new(u, ValueSource::File))
        });
    result.password = env(PASSWORD_ENV)
        .map(|p| Resolved::new(p, ValueSource::EnvVar(PASSWORD_ENV.to_string())))
        .or_else(|| {
            file.password
                .clone()
                .map(|p| Resolved::new(p, ValueSource::File))
        });

    result.validate()?;
    Ok(result)
}

fn load_file(path: &Path) -> Result<SettingsFile> {
    SettingsFile::load(path).map_err(|e| match e {
        Error::ConfigFile(inner) => {
            Error::InvalidInput(format!("{}: {}", path.display(), inner.message()))
        }
        other => other,
    })
}
