//! Operator commands.
//!
//! Two paths, matching how the backend exposes them:
//! - fire-and-forget control messages over the live channel
//!   ([`ControlChannel`]);
//! - confirmable HTTP requests, submitted through a [`RequestRunner`] and
//!   completed later with an [`ApiOutcome`].

use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{ApiClient, MessageReply, MockGpioReply};
use crate::models::{ConfigDocument, UpdateConfigReply, parse_config_payload};
use crate::protocol::{ControlMessage, RelayAction};
use crate::{Error, Result};

use super::Console;
use super::connection::ChannelHandle;
use super::document::NodeKey;
use super::events::LogKind;
use super::queue::lane_label;

pub const AUTH_REQUIRED_MESSAGE: &str = "Máy chủ yêu cầu đăng nhập để sử dụng chức năng này.";
const TEST_OFFLINE: &str = "Không thể test: Mất kết nối WebSocket.";
const RESET_COUNT_OFFLINE: &str = "Không thể reset đếm: Mất kết nối WebSocket.";

// ============================================================================
// Seams
// ============================================================================

/// Outbound side of the live channel.
pub trait ControlChannel {
    fn is_open(&self) -> bool;
    fn send(&self, message: &ControlMessage) -> Result<()>;
}

impl ControlChannel for ChannelHandle {
    fn is_open(&self) -> bool {
        ChannelHandle::is_open(self)
    }

    fn send(&self, message: &ControlMessage) -> Result<()> {
        ChannelHandle::send(self, message)
    }
}

/// A request/response call to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    LoadConfig { request_id: u64 },
    SaveConfig { payload: Map<String, Value> },
    ResetMaintenance,
    MockSensor { lane_index: usize, active: bool },
    ResetQueue,
}

/// Completion of an [`ApiRequest`].
#[derive(Debug)]
pub enum ApiOutcome {
    ConfigLoaded {
        request_id: u64,
        result: Result<ConfigDocument>,
    },
    ConfigSaved(Result<UpdateConfigReply>),
    MaintenanceReset(Result<MessageReply>),
    SensorMocked {
        lane_index: usize,
        active: bool,
        result: Result<MockGpioReply>,
    },
    QueueReset(Result<MessageReply>),
}

/// Runs requests off the engine's thread and reports back later.
pub trait RequestRunner {
    fn submit(&self, request: ApiRequest);
}

/// Perform one request against the backend.
pub async fn execute(api: &ApiClient, request: ApiRequest) -> ApiOutcome {
    match request {
        ApiRequest::LoadConfig { request_id } => ApiOutcome::ConfigLoaded {
            request_id,
            result: api.fetch_config().await,
        },
        ApiRequest::SaveConfig { payload } => {
            ApiOutcome::ConfigSaved(api.update_config(&payload).await)
        }
        ApiRequest::ResetMaintenance => ApiOutcome::MaintenanceReset(api.reset_maintenance().await),
        ApiRequest::MockSensor { lane_index, active } => ApiOutcome::SensorMocked {
            lane_index,
            active,
            result: api.mock_sensor(lane_index, active).await,
        },
        ApiRequest::ResetQueue => ApiOutcome::QueueReset(api.reset_queue().await),
    }
}

/// Spawns one tokio task per request; outcomes arrive on a channel.
#[derive(Debug, Clone)]
pub struct HttpRequestRunner {
    api: ApiClient,
    outcomes: mpsc::UnboundedSender<ApiOutcome>,
}

impl HttpRequestRunner {
    pub fn new(api: ApiClient) -> (Self, mpsc::UnboundedReceiver<ApiOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { api, outcomes: tx }, rx)
    }
}

impl RequestRunner for HttpRequestRunner {
    fn submit(&self, request: ApiRequest) {
        let api = self.api.clone();
        let outcomes = self.outcomes.clone();
        debug!(?request, "submitting request");
        tokio::spawn(async move {
            let outcome = execute(&api, request).await;
            // receiver gone means the console is shutting down
            let _ = outcomes.send(outcome);
        });
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Something the operator asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ResetCount(usize),
    TestRelay {
        lane_index: usize,
        relay: RelayAction,
    },
    TestAllRelays,
    ToggleAutoTest,
    MockSensor {
        lane_index: usize,
        active: bool,
    },
    ResetMaintenance,
    ReloadConfig,
    /// Submit edited configuration text
    SaveConfig(String),
    ResetQueue,
}

impl Action {
    /// The control node this action is triggered through.
    pub fn control(&self) -> NodeKey {
        match *self {
            Action::ResetCount(_) => NodeKey::ResetCountButton,
            Action::TestRelay {
                lane_index,
                relay: RelayAction::Grab,
            } => NodeKey::RelayGrabButton(lane_index),
            Action::TestRelay {
                lane_index,
                relay: RelayAction::Push,
            } => NodeKey::RelayPushButton(lane_index),
            Action::TestAllRelays => NodeKey::TestAllRelaysButton,
            Action::ToggleAutoTest => NodeKey::ToggleAutoTestButton,
            Action::MockSensor {
                lane_index,
                active: true,
            } => NodeKey::MockActiveButton(lane_index),
            Action::MockSensor {
                lane_index,
                active: false,
            } => NodeKey::MockIdleButton(lane_index),
            Action::ResetMaintenance => NodeKey::ResetMaintenanceButton,
            Action::ReloadConfig => NodeKey::ReloadConfigButton,
            Action::SaveConfig(_) => NodeKey::SaveConfigButton,
            Action::ResetQueue => NodeKey::ResetQueueButton,
        }
    }
}

/// Operator-facing text for a failed request.
pub fn describe_failure(error: &Error) -> String {
    match error {
        Error::HttpStatus(code) => format!("Lỗi server: {}", code),
        other => other.to_string(),
    }
}

pub struct CommandDispatcher<C, R> {
    channel: C,
    runner: R,
}

impl<C: ControlChannel, R: RequestRunner> CommandDispatcher<C, R> {
    pub fn new(channel: C, runner: R) -> Self {
        Self { channel, runner }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Act on operator input, but only through a control that exists and is
    /// enabled. Returns whether the action was accepted.
    pub fn press(&self, console: &mut Console, action: Action) -> bool {
        let control = action.control();
        if !console.document().is_enabled(control) {
            debug!(?control, "control unavailable, ignoring input");
            return false;
        }
        self.dispatch(console, action);
        true
    }

    /// Perform an action unconditionally.
    pub fn dispatch(&self, console: &mut Console, action: Action) {
        match action {
            Action::ResetCount(lane_index) => {
                self.send_or_log(
                    console,
                    ControlMessage::ResetCount { lane_index },
                    RESET_COUNT_OFFLINE,
                );
            }
            Action::TestRelay { lane_index, relay } => {
                let message = ControlMessage::TestRelay {
                    lane_index,
                    relay_action: relay,
                };
                if self.send_or_log(console, message, TEST_OFFLINE) {
                    console.log(
                        LogKind::Info,
                        format!(
                            "Test {} cho Lane {}...",
                            relay.as_str().to_uppercase(),
                            lane_index + 1
                        ),
                    );
                }
            }
            Action::TestAllRelays => {
                if self.send_or_log(console, ControlMessage::TestAllRelays, TEST_OFFLINE) {
                    console.log(LogKind::Info, "Đang test tuần tự các Lane có Relay...");
                }
            }
            Action::ToggleAutoTest => {
                let enabled = !console.session().auto_test;
                let message = ControlMessage::ToggleAutoTest { enabled };
                if self.send_or_log(console, message, TEST_OFFLINE) {
                    console.set_auto_test(enabled);
                    if enabled {
                        console.log(LogKind::Warning, "ĐÃ BẬT chế độ Auto-Test (Sensor -> Relay).");
                    } else {
                        console.log(LogKind::Info, "Đã tắt chế độ Auto-Test.");
                    }
                }
            }
            Action::MockSensor { lane_index, active } => {
                if console.session().lanes.sensor_pin(lane_index).is_none() {
                    let name = lane_label(&console.session().lanes, lane_index);
                    console.log(
                        LogKind::Error,
                        format!("Lane/Sensor {} không có sensor pin để mô phỏng.", name),
                    );
                    return;
                }
                self.runner
                    .submit(ApiRequest::MockSensor { lane_index, active });
            }
            Action::ResetMaintenance => self.runner.submit(ApiRequest::ResetMaintenance),
            Action::ReloadConfig => {
                let request_id = console.session_mut().next_config_request();
                self.runner.submit(ApiRequest::LoadConfig { request_id });
            }
            Action::SaveConfig(text) => match parse_config_payload(&text) {
                Ok(payload) => self.runner.submit(ApiRequest::SaveConfig { payload }),
                Err(e) => {
                    let reason = match e {
                        Error::InvalidConfig(reason) => reason,
                        other => other.to_string(),
                    };
                    console.log(LogKind::Error, format!("Lỗi JSON Cấu hình: {}", reason));
                }
            },
            Action::ResetQueue => self.runner.submit(ApiRequest::ResetQueue),
        }
    }

    /// Apply a finished request to the console.
    pub fn complete(&self, console: &mut Console, outcome: ApiOutcome) {
        if is_auth_failure(&outcome) {
            console.log(LogKind::Error, AUTH_REQUIRED_MESSAGE);
            return;
        }

        match outcome {
            ApiOutcome::ConfigLoaded { request_id, result } => {
                if !console.session().is_current_config_request(request_id) {
                    debug!(request_id, "discarding superseded config response");
                    return;
                }
                match result {
                    Ok(doc) => {
                        console.apply_config(doc);
                        console.log(LogKind::Success, "Đã tải cấu hình từ server.");
                    }
                    Err(e) => {
                        warn!(error = %e, "config fetch failed");
                        console.log(LogKind::Error, "Không thể tải cấu hình.");
                    }
                }
            }
            ApiOutcome::ConfigSaved(result) => match result {
                Ok(reply) => {
                    let kind = if reply.restart_required {
                        LogKind::Warning
                    } else {
                        LogKind::Success
                    };
                    let message = reply
                        .message
                        .unwrap_or_else(|| "Đã lưu cấu hình mới.".to_string());
                    console.log(kind, message);
                    self.dispatch(console, Action::ReloadConfig);
                }
                Err(e) => {
                    warn!(error = %e, "config save failed");
                    console.log(
                        LogKind::Error,
                        format!("Không thể lưu config: {}", describe_failure(&e)),
                    );
                }
            },
            ApiOutcome::MaintenanceReset(result) => match result {
                Ok(reply) => console.log(
                    LogKind::Info,
                    reply
                        .message
                        .unwrap_or_else(|| "Đã gửi yêu cầu thoát bảo trì.".to_string()),
                ),
                Err(e) => log_failure(console, e, "Không thể reset bảo trì"),
            },
            ApiOutcome::SensorMocked {
                lane_index,
                active,
                result,
            } => match result {
                Ok(reply) => {
                    let lane = reply
                        .lane
                        .unwrap_or_else(|| lane_label(&console.session().lanes, lane_index));
                    let pin = reply
                        .pin
                        .or_else(|| console.session().lanes.sensor_pin(lane_index))
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "?".to_string());
                    let state = if active { "PHÁT HIỆN" } else { "BÌNH THƯỜNG" };
                    console.log(
                        LogKind::Info,
                        format!(
                            "Đã đặt cảm biến {} về trạng thái {} (pin {}).",
                            lane, state, pin
                        ),
                    );
                }
                Err(e) => log_failure(console, e, "Không thể mô phỏng cảm biến"),
            },
            ApiOutcome::QueueReset(result) => match result {
                Ok(reply) => console.log(
                    LogKind::Info,
                    reply
                        .message
                        .unwrap_or_else(|| "Đã reset hàng chờ thành công.".to_string()),
                ),
                Err(e) => log_failure(console, e, "Không thể reset hàng chờ"),
            },
        }
    }

    fn send_or_log(&self, console: &mut Console, message: ControlMessage, offline: &str) -> bool {
        if !self.channel.is_open() {
            console.log(LogKind::Error, offline);
            return false;
        }
        match self.channel.send(&message) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "control message not sent");
                console.log(LogKind::Error, offline);
                false
            }
        }
    }
}

fn is_auth_failure(outcome: &ApiOutcome) -> bool {
    let error = match outcome {
        ApiOutcome::ConfigLoaded { result, .. } => result.as_ref().err(),
        ApiOutcome::ConfigSaved(result) => result.as_ref().err(),
        ApiOutcome::MaintenanceReset(result) | ApiOutcome::QueueReset(result) => {
            result.as_ref().err()
        }
        ApiOutcome::SensorMocked { result, .. } => result.as_ref().err(),
    };
    matches!(error, Some(Error::AuthRequired))
}

/// An explicit backend `error` is shown as-is; anything else gets the
/// operation's context prefix.
fn log_failure(console: &mut Console, error: Error, context: &str) {
    warn!(error = %error, context, "request failed");
    match error {
        Error::Api(message) => console.log(LogKind::Error, message),
        other => console.log(
            LogKind::Error,
            format!("{}: {}", context, describe_failure(&other)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::document::NodeKey;
    use std::cell::{Cell, RefCell};
    use std::time::Instant;

    #[derive(Default)]
    struct FakeChannel {
        open: Cell<bool>,
        sent: RefCell<Vec<ControlMessage>>,
    }

    impl ControlChannel for &FakeChannel {
        fn is_open(&self) -> bool {
            self.open.get()
        }

        fn send(&self, message: &ControlMessage) -> Result<()> {
            if !self.open.get() {
                return Err(Error::ChannelClosed);
            }
            self.sent.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRunner {
        submitted: RefCell<Vec<ApiRequest>>,
    }

    impl RequestRunner for &FakeRunner {
        fn submit(&self, request: ApiRequest) {
            self.submitted.borrow_mut().push(request);
        }
    }

    fn console() -> Console {
        Console::new(100)
    }

    fn last_log(console: &Console) -> (LogKind, String) {
        let line = console.log_panel().latest().unwrap();
        (line.kind, line.message.clone())
    }

    fn snapshot(console: &mut Console, json: &str) {
        console.handle_frame(
            &format!(r#"{{"type": "state_update", "state": {}}}"#, json),
            Instant::now(),
        );
    }

    const TWO_LANES: &str = r#"{"lanes": [
        {"id": "SP001", "name": "A", "sensor_pin": 5, "push_pin": 11},
        {"id": "NG", "name": "Pass"}
    ]}"#;

    #[test]
    fn test_fire_and_forget_requires_open_channel() {
        let channel = FakeChannel::default();
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();

        dispatcher.dispatch(
            &mut console,
            Action::TestRelay {
                lane_index: 0,
                relay: RelayAction::Grab,
            },
        );
        assert_eq!(last_log(&console), (LogKind::Error, TEST_OFFLINE.to_string()));
        assert!(channel.sent.borrow().is_empty());

        dispatcher.dispatch(&mut console, Action::ResetCount(1));
        assert_eq!(last_log(&console).1, RESET_COUNT_OFFLINE);

        channel.open.set(true);
        dispatcher.dispatch(
            &mut console,
            Action::TestRelay {
                lane_index: 0,
                relay: RelayAction::Grab,
            },
        );
        assert_eq!(last_log(&console), (LogKind::Info, "Test GRAB cho Lane 1...".to_string()));
        assert_eq!(
            channel.sent.borrow()[0],
            ControlMessage::TestRelay {
                lane_index: 0,
                relay_action: RelayAction::Grab
            }
        );
    }

    #[test]
    fn test_toggle_auto_test_flips_local_flag() {
        let channel = FakeChannel::default();
        channel.open.set(true);
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();

        dispatcher.dispatch(&mut console, Action::ToggleAutoTest);
        assert!(console.session().auto_test);
        assert_eq!(last_log(&console).0, LogKind::Warning);
        dispatcher.dispatch(&mut console, Action::ToggleAutoTest);
        assert!(!console.session().auto_test);
        assert_eq!(last_log(&console), (LogKind::Info, "Đã tắt chế độ Auto-Test.".to_string()));
        assert_eq!(
            channel.sent.borrow().as_slice(),
            &[
                ControlMessage::ToggleAutoTest { enabled: true },
                ControlMessage::ToggleAutoTest { enabled: false }
            ]
        );
    }

    #[test]
    fn test_mock_sensor_checks_pin_locally() {
        let channel = FakeChannel::default();
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();
        snapshot(&mut console, TWO_LANES);

        dispatcher.dispatch(
            &mut console,
            Action::MockSensor {
                lane_index: 1,
                active: true,
            },
        );
        assert_eq!(
            last_log(&console).1,
            "Lane/Sensor Pass không có sensor pin để mô phỏng."
        );
        assert!(runner.submitted.borrow().is_empty());

        dispatcher.dispatch(
            &mut console,
            Action::MockSensor {
                lane_index: 0,
                active: true,
            },
        );
        assert_eq!(
            runner.submitted.borrow()[0],
            ApiRequest::MockSensor {
                lane_index: 0,
                active: true
            }
        );

        dispatcher.complete(
            &mut console,
            ApiOutcome::SensorMocked {
                lane_index: 0,
                active: true,
                result: Ok(MockGpioReply {
                    lane: Some("A".to_string()),
                    pin: Some(5),
                    state: Some(0),
                }),
            },
        );
        assert_eq!(
            last_log(&console).1,
            "Đã đặt cảm biến A về trạng thái PHÁT HIỆN (pin 5)."
        );
    }

    #[test]
    fn test_invalid_config_never_submitted() {
        let channel = FakeChannel::default();
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();

        dispatcher.dispatch(&mut console, Action::SaveConfig("[1, 2]".to_string()));
        assert_eq!(
            last_log(&console).1,
            "Lỗi JSON Cấu hình: Dữ liệu config phải là một đối tượng JSON (Object)."
        );
        dispatcher.dispatch(&mut console, Action::SaveConfig("{oops".to_string()));
        assert!(last_log(&console).1.starts_with("Lỗi JSON Cấu hình: "));
        assert!(runner.submitted.borrow().is_empty());
    }

    #[test]
    fn test_save_with_restart_warns_then_reloads() {
        let channel = FakeChannel::default();
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();

        dispatcher.dispatch(&mut console, Action::SaveConfig(r#"{"lanes_config": []}"#.to_string()));
        assert!(matches!(runner.submitted.borrow()[0], ApiRequest::SaveConfig { .. }));

        dispatcher.complete(
            &mut console,
            ApiOutcome::ConfigSaved(Ok(UpdateConfigReply {
                message: Some("Cần khởi động lại".to_string()),
                restart_required: true,
            })),
        );
        assert_eq!(last_log(&console), (LogKind::Warning, "Cần khởi động lại".to_string()));
        assert!(matches!(
            runner.submitted.borrow().last(),
            Some(ApiRequest::LoadConfig { .. })
        ));
    }

    #[test]
    fn test_stale_config_response_discarded() {
        let channel = FakeChannel::default();
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();

        dispatcher.dispatch(&mut console, Action::ReloadConfig);
        dispatcher.dispatch(&mut console, Action::ReloadConfig);
        let ids: Vec<u64> = runner
            .submitted
            .borrow()
            .iter()
            .filter_map(|r| match r {
                ApiRequest::LoadConfig { request_id } => Some(*request_id),
                _ => None,
            })
            .collect();
        assert_eq!(ids.len(), 2);

        let doc: ConfigDocument =
            serde_json::from_str(r#"{"lanes_config": [{"name": "Old"}]}"#).unwrap();
        dispatcher.complete(
            &mut console,
            ApiOutcome::ConfigLoaded {
                request_id: ids[0],
                result: Ok(doc),
            },
        );
        assert!(console.config().is_none());
        assert!(console.log_panel().is_empty());

        let doc: ConfigDocument =
            serde_json::from_str(r#"{"lanes_config": [{"name": "New"}, {"name": "Two"}]}"#)
                .unwrap();
        dispatcher.complete(
            &mut console,
            ApiOutcome::ConfigLoaded {
                request_id: ids[1],
                result: Ok(doc),
            },
        );
        assert_eq!(last_log(&console), (LogKind::Success, "Đã tải cấu hình từ server.".to_string()));
        assert_eq!(console.session().rendered_lane_count, 2);
        assert_eq!(console.session().lanes.name(0), Some("New"));
    }

    #[test]
    fn test_auth_failure_logs_single_notice() {
        let channel = FakeChannel::default();
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();

        dispatcher.complete(&mut console, ApiOutcome::QueueReset(Err(Error::AuthRequired)));
        assert_eq!(console.log_panel().len(), 1);
        assert_eq!(last_log(&console), (LogKind::Error, AUTH_REQUIRED_MESSAGE.to_string()));
    }

    #[test]
    fn test_request_failure_messages() {
        let channel = FakeChannel::default();
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();

        dispatcher.complete(
            &mut console,
            ApiOutcome::QueueReset(Err(Error::Api("Hàng chờ đang bận".to_string()))),
        );
        assert_eq!(last_log(&console).1, "Hàng chờ đang bận");

        dispatcher.complete(&mut console, ApiOutcome::MaintenanceReset(Err(Error::HttpStatus(500))));
        assert_eq!(last_log(&console).1, "Không thể reset bảo trì: Lỗi server: 500");

        dispatcher.complete(&mut console, ApiOutcome::QueueReset(Ok(MessageReply::default())));
        assert_eq!(last_log(&console).1, "Đã reset hàng chờ thành công.");

        dispatcher.complete(
            &mut console,
            ApiOutcome::ConfigLoaded {
                request_id: 0,
                result: Err(Error::HttpStatus(502)),
            },
        );
        assert_eq!(last_log(&console).1, "Không thể tải cấu hình.");
    }

    #[test]
    fn test_press_respects_maintenance_lockout() {
        let channel = FakeChannel::default();
        channel.open.set(true);
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();
        snapshot(
            &mut console,
            r#"{"lanes": [{"name": "A", "sensor_pin": 5, "push_pin": 1}], "maintenance_mode": true}"#,
        );

        assert!(!dispatcher.press(&mut console, Action::ResetQueue));
        assert!(!dispatcher.press(
            &mut console,
            Action::TestRelay {
                lane_index: 0,
                relay: RelayAction::Push
            }
        ));
        assert!(dispatcher.press(&mut console, Action::ResetMaintenance));
        assert_eq!(runner.submitted.borrow().as_slice(), &[ApiRequest::ResetMaintenance]);
        assert!(channel.sent.borrow().is_empty());
    }

    #[test]
    fn test_press_requires_existing_control() {
        let channel = FakeChannel::default();
        channel.open.set(true);
        let runner = FakeRunner::default();
        let dispatcher = CommandDispatcher::new(&channel, &runner);
        let mut console = console();
        snapshot(&mut console, TWO_LANES);

        // pass-through lane has no relay buttons
        assert!(!dispatcher.press(
            &mut console,
            Action::TestRelay {
                lane_index: 1,
                relay: RelayAction::Grab
            }
        ));
        assert_eq!(
            Action::MockSensor {
                lane_index: 1,
                active: false
            }
            .control(),
            NodeKey::MockIdleButton(1)
        );
    }
}
