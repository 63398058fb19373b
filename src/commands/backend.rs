//! One-shot commands against the backend's HTTP endpoints, plus `status`,
//! which reads a single snapshot off the live channel.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::ConsoleSettings;
use crate::console::queue::lane_label;
use crate::console::topology::{MOCK_ACTIVE_TEXT, MOCK_IDLE_TEXT};
use crate::console::{ChannelEvent, ConnectionManager};
use crate::models::{
    ConfigDocument, LaneIndex, MachineState, SortLogSummary, parse_config_payload,
};
use crate::protocol::{Inbound, classify};
use crate::{Error, Result};

use super::{Output, api_client};

const SAVED_DEFAULT_MESSAGE: &str = "Đã lưu cấu hình mới.";

// ============================================================================
// status
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LaneSummary {
    /// 1-based lane number
    pub lane: usize,
    pub id: String,
    pub name: String,
    pub status: String,
    pub count: u64,
    pub sorting: bool,
    /// `None` when the lane has no sensor
    pub sensor_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub url: String,
    pub lanes: Vec<LaneSummary>,
    pub total_count: u64,
    pub maintenance_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub is_mock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpio_mode: Option<String>,
    pub auth_enabled: bool,
    /// Entry gantry reading; `None` when the gantry is not in use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gantry_active: Option<bool>,
    /// Lane names in queue order, head first
    pub queue: Vec<String>,
}

impl StatusSummary {
    pub fn from_state(url: impl Into<String>, state: &MachineState) -> Self {
        let index = LaneIndex::from_lanes(&state.lanes);
        let lanes = state
            .lanes
            .iter()
            .enumerate()
            .map(|(i, lane)| LaneSummary {
                lane: i + 1,
                id: lane.id.clone(),
                name: lane.name.clone(),
                status: lane.status.clone(),
                count: lane.count,
                sorting: lane.is_sorting(),
                sensor_active: lane.has_sensor().then(|| lane.sensor_active()),
            })
            .collect();

        Self {
            url: url.into(),
            lanes,
            total_count: state.total_count(),
            maintenance_mode: state.maintenance_mode,
            last_error: state.last_error.clone(),
            is_mock: state.is_mock,
            gpio_mode: state.gpio_mode.clone(),
            auth_enabled: state.auth_enabled,
            gantry_active: state.gantry_enabled().then(|| state.gantry_active()),
            queue: state
                .queue_indices
                .iter()
                .map(|&i| lane_label(&index, i))
                .collect(),
        }
    }
}

impl Output for StatusSummary {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Sortline @ {}", self.url)];

        let mode = if self.is_mock { "mock" } else { "hardware" };
        let mut header = format!("Mode: {}", mode);
        if let Some(gpio) = &self.gpio_mode {
            header.push_str(&format!(" (gpio: {})", gpio));
        }
        header.push_str(if self.maintenance_mode {
            " | MAINTENANCE"
        } else {
            " | running"
        });
        if self.auth_enabled {
            header.push_str(" | auth");
        }
        lines.push(header);

        if self.maintenance_mode {
            lines.push(format!(
                "  Error: {}",
                self.last_error.as_deref().unwrap_or("Lỗi không xác định.")
            ));
        }
        if let Some(active) = self.gantry_active {
            lines.push(format!(
                "Entry gantry: {}",
                if active { "active" } else { "idle" }
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "{} lane(s), {} item(s) counted:",
            self.lanes.len(),
            self.total_count
        ));
        for lane in &self.lanes {
            let sensor = match lane.sensor_active {
                Some(true) => "sensor: active",
                Some(false) => "sensor: idle",
                None => "sensor: none",
            };
            let kind = if lane.sorting { "" } else { " (pass-through)" };
            lines.push(format!(
                "  {}. {} [{}]{}  {}  count {}  {}",
                lane.lane, lane.name, lane.id, kind, lane.status, lane.count, sensor
            ));
        }

        lines.push(String::new());
        if self.queue.is_empty() {
            lines.push("Queue: (empty)".to_string());
        } else {
            lines.push(format!("Queue: {}", self.queue.join(" → ")));
        }
        lines.join("\n")
    }
}

/// Connect, wait for the first snapshot, disconnect.
pub async fn status(settings: &ConsoleSettings, timeout: Duration) -> Result<StatusSummary> {
    let url = settings.ws_url();
    let manager = ConnectionManager::new(url.clone(), settings.reconnect_delay())
        .with_credentials(settings.credentials());
    let (handle, mut events, task) = manager.spawn();

    let waited = tokio::time::timeout(timeout, first_snapshot(&mut events)).await;
    task.abort();
    drop(handle);

    match waited {
        Ok(Some(state)) => Ok(StatusSummary::from_state(url, &state)),
        Ok(None) => Err(Error::ChannelClosed),
        Err(_) => Err(Error::Timeout(format!(
            "no state snapshot from {} within {}s",
            url,
            timeout.as_secs()
        ))),
    }
}

async fn first_snapshot(events: &mut mpsc::UnboundedReceiver<ChannelEvent>) -> Option<MachineState> {
    while let Some(event) = events.recv().await {
        match event {
            ChannelEvent::Frame(frame) => {
                if let Inbound::Snapshot(state) = classify(&frame) {
                    return Some(*state);
                }
            }
            ChannelEvent::Error(reason) => debug!(%reason, "waiting for snapshot"),
            _ => {}
        }
    }
    None
}

// ============================================================================
// config
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ConfigShow {
    pub config: ConfigDocument,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        serde_json::to_string(&self.config).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        self.config.to_pretty_json().unwrap_or_default()
    }
}

pub async fn config_get(settings: &ConsoleSettings) -> Result<ConfigShow> {
    let config = api_client(settings)?.fetch_config().await?;
    Ok(ConfigShow { config })
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigPushed {
    pub message: String,
    pub restart_required: bool,
    pub config: ConfigDocument,
}

impl Output for ConfigPushed {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut out = self.message.clone();
        if self.restart_required {
            out.push_str("\n(restart required)");
        }
        out
    }
}

/// Validate `path` locally, submit it and re-read what the backend now holds.
pub async fn config_push(settings: &ConsoleSettings, path: &Path) -> Result<ConfigPushed> {
    let text = std::fs::read_to_string(path)?;
    let payload = parse_config_payload(&text)?;
    let api = api_client(settings)?;

    let reply = api.update_config(&payload).await?;
    info!(restart_required = reply.restart_required, "configuration saved");
    let config = api.fetch_config().await?;

    Ok(ConfigPushed {
        message: reply
            .message
            .unwrap_or_else(|| SAVED_DEFAULT_MESSAGE.to_string()),
        restart_required: reply.restart_required,
        config,
    })
}

// ============================================================================
// maintenance / queue / mock
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResult {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Output for MessageResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("{}: done", self.action))
    }
}

pub async fn maintenance_reset(settings: &ConsoleSettings) -> Result<MessageResult> {
    let reply = api_client(settings)?.reset_maintenance().await?;
    Ok(MessageResult {
        action: "maintenance_reset",
        message: reply.message,
    })
}

pub async fn queue_reset(settings: &ConsoleSettings) -> Result<MessageResult> {
    let reply = api_client(settings)?.reset_queue().await?;
    Ok(MessageResult {
        action: "queue_reset",
        message: reply.message,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct MockResult {
    /// 1-based lane number
    pub lane: usize,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<i64>,
}

impl Output for MockResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let name = self
            .lane_name
            .clone()
            .unwrap_or_else(|| format!("Lane {}", self.lane));
        let pin = self
            .pin
            .map(|p| format!(" (pin {})", p))
            .unwrap_or_default();
        let level = if self.active {
            MOCK_ACTIVE_TEXT
        } else {
            MOCK_IDLE_TEXT
        };
        format!("{}{}: {}", name, pin, level)
    }
}

pub async fn mock_sensor(
    settings: &ConsoleSettings,
    lane_index: usize,
    active: bool,
) -> Result<MockResult> {
    let reply = api_client(settings)?
        .mock_sensor(lane_index, active)
        .await?;
    Ok(MockResult {
        lane: lane_index + 1,
        active,
        lane_name: reply.lane,
        pin: reply.pin,
    })
}

// ============================================================================
// sort-log
// ============================================================================

impl Output for SortLogSummary {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.days.is_empty() {
            return format!("No sort history. Today ({}): {}", self.today, self.today_total);
        }
        let width = self
            .lanes
            .iter()
            .map(|l| l.lane.chars().count())
            .max()
            .unwrap_or(4)
            .max(4);

        let mut lines = Vec::new();
        let mut header = format!("{:<width$}", "Lane", width = width);
        for day in &self.days {
            // MM-DD is enough in a column header
            header.push_str(&format!(" {:>6}", day.get(5..).unwrap_or(day)));
        }
        header.push_str(&format!(" {:>7}", "Total"));
        lines.push(header);

        for lane in &self.lanes {
            let pad = width.saturating_sub(lane.lane.chars().count());
            let mut row = format!("{}{}", lane.lane, " ".repeat(pad));
            for count in &lane.per_day {
                row.push_str(&format!(" {:>6}", count));
            }
            row.push_str(&format!(" {:>7}", lane.total));
            lines.push(row);
        }
        lines.push(String::new());
        lines.push(format!("Today ({}): {}", self.today, self.today_total));
        lines.join("\n")
    }
}

/// Per-lane totals for the last `days` days, ordered like the current topology.
pub async fn sort_log(settings: &ConsoleSettings, days: usize) -> Result<SortLogSummary> {
    if days == 0 {
        return Err(Error::InvalidInput("--days must be at least 1".to_string()));
    }
    let api = api_client(settings)?;
    let config = api.fetch_config().await?;
    let log = api.sort_log().await?;
    let names: Vec<String> = config.lanes().into_iter().map(|lane| lane.name).collect();
    let today = chrono::Local::now().date_naive();
    Ok(SortLogSummary::build(&log, &names, days, today))
}
