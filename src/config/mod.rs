//! Console settings.
//!
//! Settings live in `config.toml`:
//! - `--config <path>` if given
//! - else `$SORTLINE_CONFIG`
//! - else `~/.config/sortline/config.toml`
//!
//! ## Precedence
//!
//! CLI flag > environment > settings file > defaults
//!
//! Use the [`resolver`] module for resolution with source tracking.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_PATH_ENV, ConsoleSettings, HOST_ENV, PASSWORD_ENV, PORT_ENV, Resolved, SettingsOverrides,
    SettingEntry, SettingsReport, USERNAME_ENV, ValueSource, default_config_path, resolve_settings,
};
pub use schema::{Credentials, SettingsFile};
