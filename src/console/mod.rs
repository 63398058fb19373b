//! State synchronization engine.
//!
//! [`Console`] is the single owner of everything the operator sees: derived
//! lane maps, the view document, the log and the QR overlay. Frames from the
//! live channel and completions of HTTP requests are applied to it in arrival
//! order by one event loop; nothing here locks.

pub mod connection;
pub mod dispatch;
pub mod document;
pub mod events;
pub mod overlay;
pub mod queue;
pub mod reconcile;
pub mod topology;

use std::time::Instant;

use tracing::{debug, warn};

use crate::models::{ConfigDocument, LaneIndex, MachineState};
use crate::protocol::{Inbound, LogEvent, classify};

pub use connection::{
    ChannelEvent, ChannelHandle, ConnectionManager, ConnectionState, ReconnectScheduler,
};
pub use dispatch::{
    Action, ApiOutcome, ApiRequest, CommandDispatcher, ControlChannel, HttpRequestRunner,
    RequestRunner,
};
pub use document::{Document, Mark, Node, NodeKey, NodeKind, Tone};
pub use events::{LogKind, LogLine, LogPanel};
pub use overlay::QrOverlay;

pub const MALFORMED_FRAME_MESSAGE: &str = "Nhận được tin nhắn WebSocket không hợp lệ.";

/// Client-side session state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Maps from the latest snapshot or configuration load
    pub lanes: LaneIndex,
    /// Lane count the topology was last built for
    pub rendered_lane_count: usize,
    pub auto_test: bool,
    config_request: u64,
}

impl Session {
    /// Issue the id for a new configuration fetch, superseding earlier ones.
    pub fn next_config_request(&mut self) -> u64 {
        self.config_request += 1;
        self.config_request
    }

    pub fn is_current_config_request(&self, request_id: u64) -> bool {
        request_id == self.config_request
    }
}

pub struct Console {
    session: Session,
    document: Document,
    log: LogPanel,
    overlay: QrOverlay,
    state: Option<MachineState>,
    config: Option<ConfigDocument>,
    connection: ConnectionState,
}

impl Console {
    pub fn new(log_retention: usize) -> Self {
        Self {
            session: Session::default(),
            document: Document::new(),
            log: LogPanel::new(log_retention),
            overlay: QrOverlay::new(),
            state: None,
            config: None,
            connection: ConnectionState::Disconnected,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn log_panel(&self) -> &LogPanel {
        &self.log
    }

    pub fn overlay(&self) -> &QrOverlay {
        &self.overlay
    }

    /// Latest snapshot, held whole.
    pub fn state(&self) -> Option<&MachineState> {
        self.state.as_ref()
    }

    /// Last configuration loaded from the backend.
    pub fn config(&self) -> Option<&ConfigDocument> {
        self.config.as_ref()
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// Classify and apply one inbound text frame.
    pub fn handle_frame(&mut self, frame: &str, now: Instant) {
        match classify(frame) {
            Inbound::Snapshot(state) => self.apply_snapshot(*state),
            Inbound::Log(event) => self.present(&event, now),
            Inbound::Ignored => debug!("ignoring frame"),
            Inbound::Malformed(reason) => {
                warn!(%reason, "malformed frame");
                self.log(LogKind::Error, MALFORMED_FRAME_MESSAGE);
            }
        }
    }

    pub fn apply_snapshot(&mut self, state: MachineState) {
        let rebuilt = reconcile::reconcile(&mut self.session, &mut self.document, &state);
        debug!(lanes = state.lanes.len(), rebuilt, "snapshot applied");
        self.state = Some(state);
    }

    /// Adopt a freshly loaded configuration: maps always, topology only if
    /// the lane count changed.
    pub fn apply_config(&mut self, config: ConfigDocument) {
        let lanes = config.lanes();
        reconcile::sync_topology(&mut self.session, &mut self.document, &lanes);
        self.config = Some(config);
    }

    /// Render a backend log event, triggering the overlay for QR kinds.
    pub fn present(&mut self, event: &LogEvent, now: Instant) {
        let presented = events::present(event, &self.session.lanes, events::local_time);
        if let Some(overlay) = presented.overlay {
            self.overlay.show(overlay.text, overlay.tone, now);
        }
        self.log.push(presented.line);
    }

    /// Append a locally generated line.
    pub fn log(&mut self, kind: LogKind, message: impl Into<String>) {
        self.log.push(LogLine {
            kind,
            time: events::local_time(),
            message: message.into(),
        });
    }

    pub fn set_auto_test(&mut self, enabled: bool) {
        self.session.auto_test = enabled;
        self.document.set_text(
            NodeKey::ToggleAutoTestButton,
            if enabled {
                "Tắt Auto Test Sensor"
            } else {
                "Bật Auto Test Sensor"
            },
        );
    }

    /// Apply a connection transition. Returns a follow-up action, if any.
    pub fn handle_channel_event(&mut self, event: ChannelEvent, now: Instant) -> Option<Action> {
        match event {
            ChannelEvent::Opened => {
                self.connection = ConnectionState::Connected;
                self.log(LogKind::Success, "Đã kết nối WebSocket với server.");
                Some(Action::ReloadConfig)
            }
            ChannelEvent::Frame(frame) => {
                self.handle_frame(&frame, now);
                None
            }
            ChannelEvent::Error(reason) => {
                debug!(%reason, "channel error");
                self.log(LogKind::Error, "Lỗi WebSocket.");
                None
            }
            ChannelEvent::Closed { retry_in, attempt } => {
                self.connection = ConnectionState::Reconnecting {
                    attempt,
                    next_retry: Some(now + retry_in),
                };
                self.log(
                    LogKind::Error,
                    format!(
                        "Mất kết nối WebSocket. Đang thử kết nối lại sau {}...",
                        connection::delay_label(retry_in)
                    ),
                );
                None
            }
        }
    }

    /// Periodic housekeeping from the render tick.
    pub fn tick(&mut self, now: Instant) {
        self.overlay.expire(now);
    }
}
