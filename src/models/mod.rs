//! Data models mirrored from the sorting-line backend.
//!
//! The backend owns every value here; the console only ever holds the most
//! recent snapshot, replaced wholesale on each `state_update`.

pub mod config;
pub mod stats;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use config::{parse_config_payload, ConfigDocument, LaneConfig, UpdateConfigReply};
pub use stats::{LaneTotal, SortLog, SortLogSummary};

/// Status label the backend assigns to an idle lane.
pub const READY_STATUS: &str = "Sẵn sàng";

/// Reading reported by an idle (untriggered) sensor.
pub const SENSOR_IDLE: i64 = 1;

fn default_sensor_reading() -> i64 {
    SENSOR_IDLE
}

fn default_status() -> String {
    READY_STATUS.to_string()
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_status))
}

/// One physical lane as reported in a snapshot.
///
/// The lane's index is not stored: it is its position in [`MachineState::lanes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub sensor_pin: Option<i64>,
    #[serde(default)]
    pub push_pin: Option<i64>,
    #[serde(default)]
    pub pull_pin: Option<i64>,
    /// 0 = triggered, anything else = idle
    #[serde(default = "default_sensor_reading")]
    pub sensor_reading: i64,
    #[serde(default)]
    pub relay_grab: i64,
    #[serde(default)]
    pub relay_push: i64,
    #[serde(default)]
    pub count: u64,
    #[serde(default = "default_status", deserialize_with = "null_as_default_status")]
    pub status: String,
}

impl Lane {
    /// A lane with an actuator (push or pull pin) that can divert items.
    pub fn is_sorting(&self) -> bool {
        self.push_pin.is_some() || self.pull_pin.is_some()
    }

    pub fn has_sensor(&self) -> bool {
        self.sensor_pin.is_some()
    }

    /// Sensor is triggered. Every view uses this one predicate.
    pub fn sensor_active(&self) -> bool {
        self.sensor_reading == 0
    }

    pub fn grab_engaged(&self) -> bool {
        self.relay_grab == 1
    }

    pub fn push_engaged(&self) -> bool {
        self.relay_push == 1
    }
}

/// Timing section of the backend configuration.
///
/// Only the entry-gantry flag is interpreted; everything else rides along
/// in `extra` so it survives a display round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default)]
    pub use_sensor_entry_gantry: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One complete, authoritative description of the line at an instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineState {
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub is_mock: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub queue_indices: Vec<usize>,
    #[serde(default = "default_sensor_reading")]
    pub sensor_entry_reading: i64,
    #[serde(default)]
    pub timing_config: TimingConfig,
    #[serde(default)]
    pub auth_enabled: bool,
    #[serde(default)]
    pub gpio_mode: Option<String>,
    #[serde(default)]
    pub entry_queue_size: Option<u64>,
}

impl MachineState {
    pub fn gantry_enabled(&self) -> bool {
        self.timing_config.use_sensor_entry_gantry
    }

    pub fn gantry_active(&self) -> bool {
        self.sensor_entry_reading == 0
    }

    /// Total items counted across all lanes.
    pub fn total_count(&self) -> u64 {
        self.lanes.iter().map(|lane| lane.count).sum()
    }
}

/// Lookup maps derived from the latest lane list, keyed by lane index.
///
/// Always rebuilt from scratch; never merged with a previous generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneIndex {
    pub names: BTreeMap<usize, String>,
    pub ids: BTreeMap<usize, String>,
    pub sensor_pins: BTreeMap<usize, Option<i64>>,
}

impl LaneIndex {
    pub fn from_lanes(lanes: &[Lane]) -> Self {
        let mut index = Self::default();
        for (i, lane) in lanes.iter().enumerate() {
            index.names.insert(i, lane.name.clone());
            index.ids.insert(i, lane.id.clone());
            index.sensor_pins.insert(i, lane.sensor_pin);
        }
        index
    }

    pub fn name(&self, lane_index: usize) -> Option<&str> {
        self.names.get(&lane_index).map(String::as_str)
    }

    /// Sensor pin for a lane; `None` both for unknown lanes and lanes without a sensor.
    pub fn sensor_pin(&self, lane_index: usize) -> Option<i64> {
        self.sensor_pins.get(&lane_index).copied().flatten()
    }

    /// Find the lane whose external ID equals `key`.
    pub fn lane_for_id(&self, key: &str) -> Option<usize> {
        self.ids
            .iter()
            .find(|(_, id)| id.as_str() == key)
            .map(|(i, _)| *i)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
