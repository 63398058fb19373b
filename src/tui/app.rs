//! TUI Application - main event loop and terminal management
//!
//! This module contains the core TUI application logic including:
//! - Terminal setup and restoration
//! - The single event loop applying channel events, request completions and
//!   key presses to the console in arrival order
//! - Page switching between Home, Test and Config

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::ConsoleSettings;
use crate::console::connection::delay_label;
use crate::console::{
    Action, ApiOutcome, ChannelEvent, ChannelHandle, CommandDispatcher, ConnectionManager,
    ConnectionState, Console, ControlChannel, HttpRequestRunner, LogKind, NodeKey, RequestRunner,
};
use crate::models::ConfigDocument;
use crate::protocol::RelayAction;
use crate::{Error, Result};

use super::theme::tone_color;
use super::views::{ConfigView, HomeView, LogPanelView, TestBenchView};

/// How often the loop wakes to poll input and redraw.
const TICK: Duration = Duration::from_millis(100);

const QUEUE_RESET_PROMPT: &str = "Reset hàng chờ? (y/n)";

/// Active page in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Test,
    Config,
}

impl Page {
    fn next(self) -> Self {
        match self {
            Page::Home => Page::Test,
            Page::Test => Page::Config,
            Page::Config => Page::Home,
        }
    }
}

/// What the loop should do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Nothing,
    /// Act through the matching control, if it is enabled
    Press(Action),
    /// Act without a control to go through
    Dispatch(Action),
    EditConfig,
    Quit,
}

/// TUI Application state
pub struct TuiApp {
    console: Console,
    page: Page,
    selected_lane: usize,
    /// Waiting for y/n after `x`
    confirm_queue_reset: bool,
    should_quit: bool,
    endpoint: String,
    home: HomeView,
    test_bench: TestBenchView,
    config_view: ConfigView,
    log_view: LogPanelView,
}

impl TuiApp {
    pub fn new(console: Console, endpoint: impl Into<String>) -> Self {
        Self {
            console,
            page: Page::Home,
            selected_lane: 0,
            confirm_queue_reset: false,
            should_quit: false,
            endpoint: endpoint.into(),
            home: HomeView::new(),
            test_bench: TestBenchView::new(),
            config_view: ConfigView::new(),
            log_view: LogPanelView::new(),
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn selected_lane(&self) -> usize {
        self.selected_lane
    }

    fn lane_count(&self) -> usize {
        self.console.session().rendered_lane_count
    }

    /// Keep the selection inside the current topology.
    fn clamp_selection(&mut self) {
        self.selected_lane = self.selected_lane.min(self.lane_count().saturating_sub(1));
    }

    fn set_page(&mut self, page: Page) {
        if page == Page::Config && self.page != Page::Config {
            self.config_view.reset_scroll();
        }
        self.page = page;
    }

    /// Handle keyboard events
    pub fn handle_key(&mut self, key: KeyCode) -> KeyOutcome {
        self.clamp_selection();

        if self.confirm_queue_reset {
            self.confirm_queue_reset = false;
            return match key {
                KeyCode::Char('y') | KeyCode::Char('Y') => KeyOutcome::Press(Action::ResetQueue),
                _ => KeyOutcome::Nothing,
            };
        }

        let lane = self.selected_lane;
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                KeyOutcome::Quit
            }
            // Page switching
            KeyCode::Tab => {
                self.set_page(self.page.next());
                KeyOutcome::Nothing
            }
            KeyCode::Char('1') => {
                self.set_page(Page::Home);
                KeyOutcome::Nothing
            }
            KeyCode::Char('2') => {
                self.set_page(Page::Test);
                KeyOutcome::Nothing
            }
            KeyCode::Char('3') => {
                self.set_page(Page::Config);
                KeyOutcome::Nothing
            }
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => {
                if self.page == Page::Config {
                    self.config_view.scroll_down();
                } else if lane + 1 < self.lane_count() {
                    self.selected_lane += 1;
                }
                KeyOutcome::Nothing
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.page == Page::Config {
                    self.config_view.scroll_up();
                } else {
                    self.selected_lane = lane.saturating_sub(1);
                }
                KeyOutcome::Nothing
            }
            KeyCode::Char('L') => {
                self.log_view.toggle_collapsed();
                KeyOutcome::Nothing
            }
            // Commands
            KeyCode::Char('c') => self.lane_action(Action::ResetCount(lane)),
            KeyCode::Char('m') => KeyOutcome::Press(Action::ResetMaintenance),
            KeyCode::Char('x') => {
                if self.console.document().is_enabled(NodeKey::ResetQueueButton) {
                    self.confirm_queue_reset = true;
                }
                KeyOutcome::Nothing
            }
            KeyCode::Char('g') => self.lane_action(Action::TestRelay {
                lane_index: lane,
                relay: RelayAction::Grab,
            }),
            KeyCode::Char('p') => self.lane_action(Action::TestRelay {
                lane_index: lane,
                relay: RelayAction::Push,
            }),
            KeyCode::Char('a') => KeyOutcome::Press(Action::TestAllRelays),
            KeyCode::Char('t') => KeyOutcome::Press(Action::ToggleAutoTest),
            KeyCode::Char('d') => self.mock_action(lane, true),
            KeyCode::Char('i') => self.mock_action(lane, false),
            KeyCode::Char('R') => KeyOutcome::Press(Action::ReloadConfig),
            KeyCode::Char('e') => {
                if self.console.config().is_none() {
                    self.console.log(LogKind::Error, "Chưa tải cấu hình từ server.");
                    KeyOutcome::Nothing
                } else if self.console.document().is_enabled(NodeKey::SaveConfigButton) {
                    KeyOutcome::EditConfig
                } else {
                    KeyOutcome::Nothing
                }
            }
            _ => KeyOutcome::Nothing,
        }
    }

    /// Lane-scoped actions need at least one lane on screen.
    fn lane_action(&self, action: Action) -> KeyOutcome {
        if self.lane_count() == 0 {
            KeyOutcome::Nothing
        } else {
            KeyOutcome::Press(action)
        }
    }

    /// Lanes without a sensor have no mock buttons; the dispatcher reports
    /// that to the operator instead.
    fn mock_action(&self, lane_index: usize, active: bool) -> KeyOutcome {
        let action = Action::MockSensor { lane_index, active };
        if self.lane_count() == 0 {
            return KeyOutcome::Nothing;
        }
        let mock_mode = !self.console.document().is_hidden(NodeKey::MockControls);
        if mock_mode && self.console.session().lanes.sensor_pin(lane_index).is_none() {
            KeyOutcome::Dispatch(action)
        } else {
            KeyOutcome::Press(action)
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame, now: Instant) {
        self.clamp_selection();
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                              // Title bar
                Constraint::Min(5),                                 // Page
                Constraint::Length(self.log_view.preferred_height()), // Log
                Constraint::Length(1),                              // Status bar
            ])
            .split(area);

        self.render_title_bar(frame, chunks[0]);

        let document = self.console.document();
        match self.page {
            Page::Home => self
                .home
                .render(frame, chunks[1], document, self.selected_lane),
            Page::Test => self
                .test_bench
                .render(frame, chunks[1], document, self.selected_lane),
            Page::Config => {
                self.config_view
                    .render(frame, chunks[1], document, self.console.config())
            }
        }

        self.log_view
            .render(frame, chunks[2], self.console.log_panel());
        self.render_status_bar(frame, chunks[3]);
        self.render_overlay(frame, area, now);
    }

    /// Render the title bar with connection status
    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let connection = self.console.connection();
        let (status_indicator, status_color) = match connection {
            ConnectionState::Connected => ("●", Color::Green),
            ConnectionState::Reconnecting { .. } => ("○", Color::Yellow),
            ConnectionState::Disconnected => ("✗", Color::Red),
        };
        let status_text = match connection {
            ConnectionState::Connected => "Đã kết nối".to_string(),
            ConnectionState::Reconnecting {
                attempt,
                next_retry,
            } => {
                let wait = next_retry
                    .map(|at| at.saturating_duration_since(Instant::now()))
                    .map(delay_label)
                    .unwrap_or_default();
                format!("Đang kết nối lại (lần {}) {}", attempt, wait)
            }
            ConnectionState::Disconnected => "Chưa kết nối".to_string(),
        };

        let active = Style::default().add_modifier(Modifier::BOLD);
        let inactive = Style::default().fg(Color::DarkGray);
        let tab = |page: Page, label: &'static str| {
            Span::styled(label, if self.page == page { active } else { inactive })
        };

        let status_display = format!("[{}] {} ", status_indicator, status_text);
        let left_width = 36 + self.endpoint.chars().count();
        let padding = (area.width as usize)
            .saturating_sub(left_width + status_display.chars().count() + 2);

        let title = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            tab(Page::Home, "[1] Tổng quan"),
            Span::raw(" | "),
            tab(Page::Test, "[2] Kiểm tra"),
            Span::raw(" | "),
            tab(Page::Config, "[3] Cấu hình"),
            Span::styled(format!("  {}", self.endpoint), inactive),
            Span::raw(" ".repeat(padding)),
            Span::styled(status_display, Style::default().fg(status_color)),
        ]))
        .block(Block::default().borders(Borders::ALL));

        frame.render_widget(title, area);
    }

    /// Render the status bar with keybindings, or the pending confirmation
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status = if self.confirm_queue_reset {
            Paragraph::new(format!(" {}", QUEUE_RESET_PROMPT)).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Paragraph::new(
                " Tab/1-3:Trang  j/k:Chọn lane  c:Reset đếm  m:Reset bảo trì  x:Reset hàng chờ  g/p:Test relay  a:Test tất cả  t:Auto test  d/i:Mock  R:Tải cấu hình  e:Sửa  L:Log  q:Thoát",
            )
            .style(Style::default().fg(Color::DarkGray))
        };
        frame.render_widget(status, area);
    }

    /// QR overlay, top-right, while visible
    fn render_overlay(&self, frame: &mut Frame, area: Rect, now: Instant) {
        let Some((text, tone)) = self.console.overlay().visible(now) else {
            return;
        };
        let rect = overlay_rect(text.chars().count(), area);
        let overlay = Paragraph::new(text.to_string())
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(tone_color(tone))
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(Clear, rect);
        frame.render_widget(overlay, rect);
    }
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;
type Dispatcher = CommandDispatcher<ChannelHandle, HttpRequestRunner>;

/// Setup the terminal for TUI mode
fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Top-right box sized to the text, clipped to `area`.
fn overlay_rect(text_len: usize, area: Rect) -> Rect {
    let width = u16::try_from(text_len)
        .unwrap_or(u16::MAX)
        .saturating_add(6)
        .min(area.width);
    let height = 3.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width.saturating_add(1)),
        y: area.y + 3.min(area.height.saturating_sub(height)),
        width,
        height,
    }
}

/// Why the event loop woke up.
#[derive(Debug)]
enum Wake {
    /// Time to read input and redraw
    Tick,
    Channel(ChannelEvent),
    Outcome(ApiOutcome),
}

/// The redraw tick keeps its own schedule, so a steady stream of frames
/// cannot postpone input handling.
fn tick_interval() -> Interval {
    let mut ticker = tokio::time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn next_wake(
    ticker: &mut Interval,
    events: &mut UnboundedReceiver<ChannelEvent>,
    outcomes: &mut UnboundedReceiver<ApiOutcome>,
) -> Wake {
    tokio::select! {
        biased;
        _ = ticker.tick() => Wake::Tick,
        Some(event) = events.recv() => Wake::Channel(event),
        Some(outcome) = outcomes.recv() => Wake::Outcome(outcome),
    }
}

fn apply_key<C: ControlChannel, R: RequestRunner>(
    dispatcher: &CommandDispatcher<C, R>,
    console: &mut Console,
    outcome: KeyOutcome,
) {
    match outcome {
        KeyOutcome::Press(action) => {
            dispatcher.press(console, action);
        }
        KeyOutcome::Dispatch(action) => dispatcher.dispatch(console, action),
        KeyOutcome::EditConfig | KeyOutcome::Quit | KeyOutcome::Nothing => {}
    }
}

/// Run the interactive console until the operator quits.
///
/// # Errors
/// Returns an error if the terminal cannot be set up or the HTTP client
/// cannot be built. Backend unavailability is not an error: the console
/// keeps retrying and says so in its log.
pub async fn run_tui(settings: ConsoleSettings) -> Result<()> {
    let api = ApiClient::new(
        settings.http_base(),
        settings.request_timeout(),
        settings.credentials(),
    )?;
    let (runner, mut outcomes) = HttpRequestRunner::new(api);
    let (channel, mut events, socket_task) =
        ConnectionManager::new(settings.ws_url(), settings.reconnect_delay())
            .with_credentials(settings.credentials())
            .spawn();
    let dispatcher = CommandDispatcher::new(channel, runner);

    let mut app = TuiApp::new(Console::new(settings.log_retention()), settings.ws_url());
    info!(endpoint = %settings.ws_url(), "console starting");

    let mut terminal = setup_terminal()?;
    let mut ticker = tick_interval();

    let result = async {
        loop {
            let now = Instant::now();
            app.console.tick(now);
            terminal.draw(|f| app.render(f, now))?;

            match next_wake(&mut ticker, &mut events, &mut outcomes).await {
                Wake::Tick => {
                    while event::poll(Duration::ZERO)? {
                        if let Event::Key(key) = event::read()? {
                            if key.kind == KeyEventKind::Press {
                                match app.handle_key(key.code) {
                                    KeyOutcome::EditConfig => {
                                        edit_config(&mut terminal, &mut app, &dispatcher, &settings)
                                            .await?;
                                    }
                                    outcome => apply_key(&dispatcher, &mut app.console, outcome),
                                }
                            }
                        }
                    }
                }
                Wake::Channel(event) => {
                    if let Some(follow_up) = app.console.handle_channel_event(event, Instant::now()) {
                        dispatcher.dispatch(&mut app.console, follow_up);
                    }
                }
                Wake::Outcome(outcome) => dispatcher.complete(&mut app.console, outcome),
            }

            if app.should_quit {
                break;
            }
        }
        Ok::<(), Error>(())
    }
    .await;

    socket_task.abort();
    restore_terminal()?;
    info!("console stopped");
    result
}

/// What came back from the external editor.
#[derive(Debug, Clone, PartialEq)]
enum EditOutcome {
    Unchanged,
    Changed(String),
    /// Editor exited unsuccessfully
    Cancelled,
    Failed(String),
}

/// Hand the current configuration to the external editor, then submit what
/// comes back if it changed. Only terminal failures are returned; anything
/// else about the edit ends up in the console log.
async fn edit_config(
    terminal: &mut Tui,
    app: &mut TuiApp,
    dispatcher: &Dispatcher,
    settings: &ConsoleSettings,
) -> Result<()> {
    let original = match app.console.config().map(ConfigDocument::to_pretty_json) {
        None => return Ok(()),
        Some(Ok(text)) => text,
        Some(Err(e)) => {
            warn!(error = %e, "could not serialize configuration for editing");
            app.console
                .log(LogKind::Error, format!("Không thể chỉnh sửa cấu hình: {}", e));
            return Ok(());
        }
    };
    let editor = settings.editor_command();

    restore_terminal()?;
    let outcome = run_editor(&editor, &original).await;
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    terminal.clear()?;

    apply_edit(dispatcher, &mut app.console, &editor, outcome);
    Ok(())
}

async fn run_editor(editor: &str, original: &str) -> EditOutcome {
    match edit_in_tempfile(editor, original).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(%editor, error = %e, "config edit failed");
            EditOutcome::Failed(e.to_string())
        }
    }
}

async fn edit_in_tempfile(editor: &str, original: &str) -> Result<EditOutcome> {
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| Error::InvalidInput("empty editor command".to_string()))?;

    let file = tempfile::Builder::new()
        .prefix("sortline-config-")
        .suffix(".json")
        .tempfile()?;
    std::fs::write(file.path(), original)?;

    let status = tokio::process::Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .await?;
    if !status.success() {
        warn!(%editor, ?status, "editor exited unsuccessfully");
        return Ok(EditOutcome::Cancelled);
    }

    let edited = std::fs::read_to_string(file.path())?;
    if edited.trim() == original.trim() {
        Ok(EditOutcome::Unchanged)
    } else {
        Ok(EditOutcome::Changed(edited))
    }
}

fn apply_edit<C: ControlChannel, R: RequestRunner>(
    dispatcher: &CommandDispatcher<C, R>,
    console: &mut Console,
    editor: &str,
    outcome: EditOutcome,
) {
    match outcome {
        EditOutcome::Unchanged => console.log(LogKind::Info, "Cấu hình không thay đổi."),
        EditOutcome::Changed(text) => {
            dispatcher.press(console, Action::SaveConfig(text));
        }
        EditOutcome::Cancelled => console.log(LogKind::Warning, "Đã hủy chỉnh sửa cấu hình."),
        EditOutcome::Failed(reason) => console.log(
            LogKind::Error,
            format!("Không thể mở trình soạn thảo '{}': {}", editor, reason),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ApiRequest;
    use crate::models::MachineState;
    use crate::protocol::ControlMessage;
    use std::cell::RefCell;

    struct OfflineChannel;

    impl ControlChannel for OfflineChannel {
        fn is_open(&self) -> bool {
            false
        }

        fn send(&self, _message: &ControlMessage) -> Result<()> {
            Err(Error::ChannelClosed)
        }
    }

    #[derive(Default)]
    struct RecordingRunner {
        submitted: RefCell<Vec<ApiRequest>>,
    }

    impl RequestRunner for &RecordingRunner {
        fn submit(&self, request: ApiRequest) {
            self.submitted.borrow_mut().push(request);
        }
    }

    fn latest(app: &TuiApp) -> (LogKind, String) {
        let line = app.console().log_panel().latest().unwrap();
        (line.kind, line.message.clone())
    }

    fn app_with_lanes(n: usize) -> TuiApp {
        let mut app = TuiApp::new(Console::new(20), "ws://localhost:3000/ws");
        let lanes: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"id": "L{0}", "name": "Lane {0}", "sensor_pin": {0}, "push_pin": 1}}"#, i))
            .collect();
        let state: MachineState =
            serde_json::from_str(&format!(r#"{{"lanes": [{}]}}"#, lanes.join(","))).unwrap();
        app.console_mut().apply_snapshot(state);
        app
    }

    #[test]
    fn test_page_switching() {
        let mut app = app_with_lanes(1);
        assert_eq!(app.page(), Page::Home);
        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.page(), Page::Test);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.page(), Page::Config);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.page(), Page::Home);
    }

    #[test]
    fn test_lane_selection_is_bounded() {
        let mut app = app_with_lanes(2);
        app.handle_key(KeyCode::Char('j'));
        app.handle_key(KeyCode::Char('j'));
        assert_eq!(app.selected_lane(), 1);
        app.handle_key(KeyCode::Char('k'));
        app.handle_key(KeyCode::Char('k'));
        assert_eq!(app.selected_lane(), 0);
    }

    #[test]
    fn test_lane_keys_target_selected_lane() {
        let mut app = app_with_lanes(3);
        app.handle_key(KeyCode::Down);
        assert_eq!(
            app.handle_key(KeyCode::Char('c')),
            KeyOutcome::Press(Action::ResetCount(1))
        );
        assert_eq!(
            app.handle_key(KeyCode::Char('p')),
            KeyOutcome::Press(Action::TestRelay {
                lane_index: 1,
                relay: RelayAction::Push
            })
        );
        assert_eq!(
            app.handle_key(KeyCode::Char('d')),
            KeyOutcome::Press(Action::MockSensor {
                lane_index: 1,
                active: true
            })
        );
    }

    #[test]
    fn test_lane_keys_need_lanes() {
        let mut app = TuiApp::new(Console::new(20), "ws://localhost:3000/ws");
        assert_eq!(app.handle_key(KeyCode::Char('g')), KeyOutcome::Nothing);
        assert_eq!(
            app.handle_key(KeyCode::Char('a')),
            KeyOutcome::Press(Action::TestAllRelays)
        );
    }

    #[test]
    fn test_queue_reset_requires_confirmation() {
        let mut app = app_with_lanes(1);
        assert_eq!(app.handle_key(KeyCode::Char('x')), KeyOutcome::Nothing);
        assert_eq!(
            app.handle_key(KeyCode::Char('y')),
            KeyOutcome::Press(Action::ResetQueue)
        );

        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.handle_key(KeyCode::Char('n')), KeyOutcome::Nothing);
        // declined prompt does not swallow the next key
        assert_eq!(app.handle_key(KeyCode::Char('q')), KeyOutcome::Quit);
    }

    #[test]
    fn test_queue_reset_locked_during_maintenance() {
        let mut app = TuiApp::new(Console::new(20), "ws://localhost:3000/ws");
        let state: MachineState =
            serde_json::from_str(r#"{"lanes": [{"name": "A"}], "maintenance_mode": true}"#).unwrap();
        app.console_mut().apply_snapshot(state);
        app.handle_key(KeyCode::Char('x'));
        // no prompt was opened, so 'y' is not a confirmation
        assert_eq!(app.handle_key(KeyCode::Char('y')), KeyOutcome::Nothing);
    }

    #[test]
    fn test_edit_without_config_logs() {
        let mut app = app_with_lanes(1);
        assert_eq!(app.handle_key(KeyCode::Char('e')), KeyOutcome::Nothing);
        assert_eq!(
            app.console().log_panel().latest().unwrap().message,
            "Chưa tải cấu hình từ server."
        );
    }

    #[test]
    fn test_mock_key_on_lane_without_sensor_reports_missing_pin() {
        let mut app = TuiApp::new(Console::new(20), "ws://localhost:3000/ws");
        let state: MachineState = serde_json::from_str(
            r#"{"lanes": [{"name": "A", "sensor_pin": 4}, {"name": "Pass"}], "is_mock": true}"#,
        )
        .unwrap();
        app.console_mut().apply_snapshot(state);
        app.handle_key(KeyCode::Down);

        let outcome = app.handle_key(KeyCode::Char('d'));
        assert_eq!(
            outcome,
            KeyOutcome::Dispatch(Action::MockSensor {
                lane_index: 1,
                active: true
            })
        );

        let runner = RecordingRunner::default();
        let dispatcher = CommandDispatcher::new(OfflineChannel, &runner);
        apply_key(&dispatcher, &mut app.console, outcome);

        let (kind, message) = latest(&app);
        assert_eq!(kind, LogKind::Error);
        assert!(message.contains("không có sensor pin"), "{}", message);
        assert!(runner.submitted.borrow().is_empty());

        // the lane with a sensor still goes through its button
        app.handle_key(KeyCode::Up);
        assert_eq!(
            app.handle_key(KeyCode::Char('i')),
            KeyOutcome::Press(Action::MockSensor {
                lane_index: 0,
                active: false
            })
        );
    }

    #[tokio::test]
    async fn test_ticks_keep_coming_under_frame_flood() {
        let (event_tx, mut events) = tokio::sync::mpsc::unbounded_channel();
        let (_outcome_tx, mut outcomes) = tokio::sync::mpsc::unbounded_channel();
        for i in 0..500 {
            event_tx.send(ChannelEvent::Frame(format!("{{\"n\":{}}}", i))).unwrap();
        }

        let mut ticker = tick_interval();
        // first tick is immediate
        assert!(matches!(
            next_wake(&mut ticker, &mut events, &mut outcomes).await,
            Wake::Tick
        ));
        assert!(matches!(
            next_wake(&mut ticker, &mut events, &mut outcomes).await,
            Wake::Channel(_)
        ));

        tokio::time::sleep(TICK + Duration::from_millis(20)).await;
        // frames are still queued, yet input gets its turn
        assert!(matches!(
            next_wake(&mut ticker, &mut events, &mut outcomes).await,
            Wake::Tick
        ));
        assert!(matches!(
            next_wake(&mut ticker, &mut events, &mut outcomes).await,
            Wake::Channel(_)
        ));
    }

    #[tokio::test]
    async fn test_failing_editor_is_logged_not_fatal() {
        let mut app = app_with_lanes(1);
        let runner = RecordingRunner::default();
        let dispatcher = CommandDispatcher::new(OfflineChannel, &runner);

        let editor = "sortline-no-such-editor-xyz";
        let outcome = run_editor(editor, "{}").await;
        assert!(matches!(outcome, EditOutcome::Failed(_)), "{:?}", outcome);
        apply_edit(&dispatcher, &mut app.console, editor, outcome);
        let (kind, message) = latest(&app);
        assert_eq!(kind, LogKind::Error);
        assert!(message.contains(editor), "{}", message);

        let outcome = run_editor("false", "{}").await;
        assert_eq!(outcome, EditOutcome::Cancelled);
        apply_edit(&dispatcher, &mut app.console, "false", outcome);
        assert_eq!(latest(&app).0, LogKind::Warning);

        assert!(matches!(run_editor("   ", "{}").await, EditOutcome::Failed(_)));
        assert!(runner.submitted.borrow().is_empty());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_editor_result_is_read_back() {
        assert_eq!(run_editor("true", "{\"a\":1}").await, EditOutcome::Unchanged);

        let dir = tempfile::TempDir::new().unwrap();
        let replacement = dir.path().join("edited.json");
        std::fs::write(&replacement, "{\"a\":2}\n").unwrap();
        let editor = format!("cp {}", replacement.display());
        assert_eq!(
            run_editor(&editor, "{\"a\":1}").await,
            EditOutcome::Changed("{\"a\":2}\n".to_string())
        );
    }

    #[test]
    fn test_overlay_width_saturates() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = overlay_rect(70_000, area);
        assert_eq!(rect.width, 80);
        assert_eq!(rect.x, 0);

        let rect = overlay_rect(10, area);
        assert_eq!((rect.x, rect.width, rect.height), (63, 16, 3));
    }
}
