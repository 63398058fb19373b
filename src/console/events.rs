//! Log presentation.
//!
//! Turns [`LogEvent`]s into display lines with a fixed prefix and tone per
//! kind, and keeps the newest lines in a bounded, newest-first buffer.

use std::collections::VecDeque;

use serde_json::Value;

use crate::models::LaneIndex;
use crate::protocol::LogEvent;

use super::document::Tone;

pub const DEFAULT_LOG_RETENTION: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Success,
    Error,
    Warning,
    SortCount,
    PassThroughCount,
    QrDetected,
    QrRejected,
    QrUnrecognized,
}

impl LogKind {
    /// Map a wire tag; anything unrecognised is informational.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "success" => LogKind::Success,
            "error" => LogKind::Error,
            "warn" => LogKind::Warning,
            "sort" => LogKind::SortCount,
            "pass" => LogKind::PassThroughCount,
            "qr" => LogKind::QrDetected,
            "qr_ng" => LogKind::QrRejected,
            "unknown_qr" => LogKind::QrUnrecognized,
            _ => LogKind::Info,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogKind::Info => "[INFO]",
            LogKind::Success => "[OK]",
            LogKind::Error => "[LỖI]",
            LogKind::Warning => "[WARN]",
            LogKind::SortCount => "[SORT]",
            LogKind::PassThroughCount => "[PASS]",
            LogKind::QrDetected | LogKind::QrRejected | LogKind::QrUnrecognized => "[QR]",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            LogKind::Info => Tone::Gray,
            LogKind::Success => Tone::Green,
            LogKind::Error => Tone::Red,
            LogKind::Warning => Tone::Yellow,
            LogKind::SortCount => Tone::Cyan,
            LogKind::PassThroughCount => Tone::Indigo,
            LogKind::QrDetected => Tone::Blue,
            LogKind::QrRejected => Tone::StrongRed,
            LogKind::QrUnrecognized => Tone::StrongYellow,
        }
    }

    /// Overlay background for QR kinds.
    pub fn overlay_tone(&self) -> Option<Tone> {
        match self {
            LogKind::QrDetected => Some(Tone::Blue),
            LogKind::QrRejected => Some(Tone::Red),
            LogKind::QrUnrecognized => Some(Tone::Yellow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LogKind,
    pub time: String,
    pub message: String,
}

impl LogLine {
    pub fn prefix(&self) -> &'static str {
        self.kind.prefix()
    }

    pub fn tone(&self) -> Tone {
        self.kind.tone()
    }

    /// `[time] [PREFIX] message`
    pub fn display(&self) -> String {
        format!("[{}] {} {}", self.time, self.prefix(), self.message)
    }
}

/// Request to show the QR overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRequest {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presented {
    pub line: LogLine,
    pub overlay: Option<OverlayRequest>,
}

/// Render a payload value the way it is shown inline: strings bare, null
/// empty, anything else as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn field_text(data: &Value, field: &str) -> String {
    value_text(data.get(field).unwrap_or(&Value::Null))
}

/// Resolve a QR data key to a lane name, falling back to the key itself.
pub fn qr_display_name(lanes: &LaneIndex, data_key: &str) -> String {
    lanes
        .lane_for_id(data_key)
        .and_then(|i| lanes.name(i))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| data_key.to_string())
}

/// Present one event. `now` supplies the local `HH:MM:SS` when the event
/// carries no timestamp.
pub fn present<F>(event: &LogEvent, lanes: &LaneIndex, now: F) -> Presented
where
    F: FnOnce() -> String,
{
    let kind = LogKind::from_tag(&event.log_type);
    let data = &event.data;
    let plain = || event.message.clone().unwrap_or_default();

    let (message, overlay_text) = match kind {
        LogKind::SortCount => (
            format!(
                "Phân loại {}, tổng: {}",
                field_text(data, "name"),
                field_text(data, "count")
            ),
            None,
        ),
        LogKind::PassThroughCount => (
            format!(
                "Đếm vật phẩm đi thẳng qua {}, tổng: {}",
                field_text(data, "name"),
                field_text(data, "count")
            ),
            None,
        ),
        LogKind::QrDetected => {
            let key = field_text(data, "data_key");
            let display = qr_display_name(lanes, &key);
            (format!("Phát hiện {} (ID: {})", display, key), Some(display))
        }
        LogKind::QrRejected => {
            let raw = value_text(data);
            (format!("Hàng NG: {}", raw), Some(raw))
        }
        LogKind::QrUnrecognized => {
            let key = field_text(data, "data_key");
            (format!("Không rõ: {}", key), Some(key))
        }
        _ => (plain(), None),
    };

    let overlay = match (overlay_text, kind.overlay_tone()) {
        (Some(text), Some(tone)) => Some(OverlayRequest { text, tone }),
        _ => None,
    };

    Presented {
        line: LogLine {
            kind,
            time: event.timestamp.clone().unwrap_or_else(now),
            message,
        },
        overlay,
    }
}

/// Local wall-clock time as shown in log lines.
pub fn local_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Bounded newest-first log.
#[derive(Debug, Clone)]
pub struct LogPanel {
    entries: VecDeque<LogLine>,
    retention: usize,
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_RETENTION)
    }
}

impl LogPanel {
    pub fn new(retention: usize) -> Self {
        let retention = retention.max(1);
        Self {
            entries: VecDeque::with_capacity(retention.min(1024)),
            retention,
        }
    }

    /// Insert at the front, evicting the oldest line past retention.
    pub fn push(&mut self, line: LogLine) {
        self.entries.push_front(line);
        while self.entries.len() > self.retention {
            self.entries.pop_back();
        }
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogLine> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogLine> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn retention(&self) -> usize {
        self.retention
    }
}
