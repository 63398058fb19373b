//! WebSocket protocol between the console and the sorting-line backend.
//!
//! The backend exposes `/ws`. Frames are JSON text.
//!
//! ## Backend → Console
//! - `{"type": "state_update", "state": {...}}`: full machine snapshot
//! - `{"type": "log", "log_type": "...", "message": "...", "timestamp": "...", "data": ...}`
//!
//! Any other `type` is ignored so that newer backends can add message kinds.
//!
//! ## Console → Backend
//! Control messages carry an `action` discriminator and are never acknowledged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::MachineState;

// ============================================================================
// Backend → Console
// ============================================================================

fn default_log_type() -> String {
    "info".to_string()
}

/// A log event pushed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Kind tag (`info`, `sort`, `qr`, ...). Unknown tags render as info.
    #[serde(default = "default_log_type")]
    pub log_type: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Backend wall-clock time, already formatted (`HH:MM:SS`).
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl LogEvent {
    /// A locally generated event (connection transitions, command results).
    pub fn local(log_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            log_type: log_type.into(),
            message: Some(message.into()),
            timestamp: None,
            data: Value::Null,
        }
    }
}

/// Result of classifying one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Full snapshot for the state reconciler.
    Snapshot(Box<MachineState>),
    /// Event for the log presenter.
    Log(LogEvent),
    /// Well-formed but not for us (unknown `type`, snapshot without lanes).
    Ignored,
    /// Could not be decoded; carries the decoder's reason.
    Malformed(String),
}

/// Classify a text frame.
///
/// Never fails: undecodable input becomes [`Inbound::Malformed`] so the caller
/// can report it and move on to the next frame.
pub fn classify(frame: &str) -> Inbound {
    let value: Value = match serde_json::from_str(frame) {
        Ok(value) => value,
        Err(e) => return Inbound::Malformed(e.to_string()),
    };

    match value.get("type").and_then(Value::as_str) {
        Some("state_update") => {
            let Some(state) = value.get("state") else {
                return Inbound::Ignored;
            };
            if !state.get("lanes").is_some_and(Value::is_array) {
                return Inbound::Ignored;
            }
            match serde_json::from_value::<MachineState>(state.clone()) {
                Ok(state) => Inbound::Snapshot(Box::new(state)),
                Err(e) => Inbound::Malformed(e.to_string()),
            }
        }
        Some("log") => match serde_json::from_value::<LogEvent>(value) {
            Ok(event) => Inbound::Log(event),
            Err(e) => Inbound::Malformed(e.to_string()),
        },
        _ => Inbound::Ignored,
    }
}

// ============================================================================
// Console → Backend
// ============================================================================

/// Relay actuated by a manual relay test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayAction {
    Grab,
    Push,
}

impl RelayAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayAction::Grab => "grab",
            RelayAction::Push => "push",
        }
    }

    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grab" | "pull" => Some(RelayAction::Grab),
            "push" => Some(RelayAction::Push),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelayAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fire-and-forget control messages.
///
/// # Examples
///
/// ```json
/// {"action": "reset_count", "lane_index": 1}
/// {"action": "test_relay", "lane_index": 0, "relay_action": "grab"}
/// {"action": "test_all_relays"}
/// {"action": "toggle_auto_test", "enabled": true}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ControlMessage {
    ResetCount {
        lane_index: usize,
    },
    TestRelay {
        lane_index: usize,
        relay_action: RelayAction,
    },
    TestAllRelays,
    ToggleAutoTest {
        enabled: bool,
    },
}

impl ControlMessage {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
