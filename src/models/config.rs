//! Backend configuration document served by `GET /config`.

use serde::{Deserialize, Serialize};

use super::{Lane, READY_STATUS, SENSOR_IDLE};

/// Static description of a lane, without live readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sensor_pin: Option<i64>,
    #[serde(default)]
    pub push_pin: Option<i64>,
    #[serde(default)]
    pub pull_pin: Option<i64>,
}

impl LaneConfig {
    /// Build an idle lane for position `index`.
    ///
    /// Missing names and IDs fall back to the backend's own defaults
    /// (`Lane {n}` and `LANE_{n}`, 1-based).
    pub fn to_lane(&self, index: usize) -> Lane {
        Lane {
            id: self
                .id
                .clone()
                .unwrap_or_else(|| format!("LANE_{}", index + 1)),
            name: self
                .name
                .clone()
                .unwrap_or_else(|| format!("Lane {}", index + 1)),
            sensor_pin: self.sensor_pin,
            push_pin: self.push_pin,
            pull_pin: self.pull_pin,
            sensor_reading: SENSOR_IDLE,
            relay_grab: 0,
            relay_push: 0,
            count: 0,
            status: READY_STATUS.to_string(),
        }
    }
}

/// Full configuration as returned by the backend.
///
/// `lanes_config` drives topology; every other section is preserved verbatim
/// so the document can be shown, edited and submitted back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub lanes_config: Vec<LaneConfig>,
    #[serde(flatten)]
    pub sections: serde_json::Map<String, serde_json::Value>,
}

impl ConfigDocument {
    pub fn lanes(&self) -> Vec<Lane> {
        self.lanes_config
            .iter()
            .enumerate()
            .map(|(i, cfg)| cfg.to_lane(i))
            .collect()
    }

    /// Pretty JSON with 4-space indentation, as shown in the config editor.
    pub fn to_pretty_json(&self) -> crate::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| crate::Error::Other(e.to_string()))
    }
}

/// Validate operator-edited configuration text before submission.
///
/// The payload must parse and must be a JSON object; anything else is
/// rejected without contacting the backend.
pub fn parse_config_payload(text: &str) -> crate::Result<serde_json::Map<String, serde_json::Value>> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(crate::Error::InvalidConfig(
            "Dữ liệu config phải là một đối tượng JSON (Object).".to_string(),
        )),
    }
}

/// Reply from `POST /update_config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfigReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub restart_required: bool,
}
