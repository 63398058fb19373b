//! Command implementations for the Sortline CLI.
//!
//! Commands are organized by how they reach the backend:
//! - `backend` - HTTP request/response endpoints and the `status` snapshot probe
//! - `channel` - fire-and-forget control messages over the live channel
//! - `settings` - local console settings, no network

pub mod backend;
pub mod channel;
pub mod settings;

use crate::api::ApiClient;
use crate::config::ConsoleSettings;
use crate::{Error, Result};

pub use backend::{
    ConfigPushed, ConfigShow, MessageResult, MockResult, StatusSummary, config_get, config_push,
    maintenance_reset, mock_sensor, queue_reset, sort_log, status,
};
pub use channel::{ControlSent, autotest, count_reset, relay_test, relay_test_all, send_control};
pub use settings::settings_report;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// HTTP client configured from the resolved settings.
pub fn api_client(settings: &ConsoleSettings) -> Result<ApiClient> {
    ApiClient::new(
        settings.http_base(),
        settings.request_timeout(),
        settings.credentials(),
    )
}

/// Convert an operator-facing lane number (1-based) to a lane index.
pub fn lane_index(lane: usize) -> Result<usize> {
    lane.checked_sub(1)
        .ok_or_else(|| Error::InvalidInput("lane numbers start at 1".to_string()))
}
