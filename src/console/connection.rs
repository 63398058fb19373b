//! Live channel to the backend.
//!
//! A single background task owns the WebSocket. It reports every transition
//! as a [`ChannelEvent`] and reconnects after a fixed delay. Outbound control
//! messages go through a [`ChannelHandle`], which refuses to send while the
//! link is down.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{MaybeTlsStream, connect_async};
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::protocol::ControlMessage;
use crate::{Error, Result};

/// Fixed delay before reconnecting.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connection state shown to the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// Connected to the backend
    Connected,
    /// Waiting for the next attempt
    Reconnecting {
        attempt: u32,
        next_retry: Option<Instant>,
    },
    /// Not connected yet, or shut down
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_reconnecting(&self) -> bool {
        matches!(self, ConnectionState::Reconnecting { .. })
    }

    /// Current reconnect attempt number (0 if not reconnecting)
    pub fn reconnect_attempt(&self) -> u32 {
        match self {
            ConnectionState::Reconnecting { attempt, .. } => *attempt,
            _ => 0,
        }
    }
}

/// Seconds rendered in the operator-facing "retrying in" message.
pub fn delay_label(delay: Duration) -> String {
    let millis = delay.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{:.1}s", delay.as_secs_f64())
    }
}

/// Guarantees at most one pending reconnect attempt.
#[derive(Debug, Clone)]
pub struct ReconnectScheduler {
    delay: Duration,
    pending: Option<Instant>,
    attempts: u32,
}

impl ReconnectScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            attempts: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a close or error. Returns `false` if an attempt was already
    /// scheduled, in which case nothing changes.
    pub fn on_close(&mut self, now: Instant) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(now + self.delay);
        true
    }

    pub fn pending(&self) -> Option<Instant> {
        self.pending
    }

    /// Claim the pending attempt once it is due.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(at) if at <= now => {
                self.pending = None;
                self.attempts += 1;
                true
            }
            _ => false,
        }
    }

    pub fn on_open(&mut self) {
        self.pending = None;
        self.attempts = 0;
    }

    /// Attempts made since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Transition reported by the socket task.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    Frame(String),
    Error(String),
    Closed { retry_in: Duration, attempt: u32 },
}

/// Sending side of the live channel.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    open: Arc<AtomicBool>,
    outbound: mpsc::UnboundedSender<String>,
}

impl ChannelHandle {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Queue one control message for the socket task.
    ///
    /// Fails with [`Error::ChannelClosed`] when the link is down.
    pub fn send(&self, message: &ControlMessage) -> Result<()> {
        if !self.is_open() {
            return Err(Error::ChannelClosed);
        }
        let json = message.to_json()?;
        self.outbound.send(json).map_err(|_| Error::ChannelClosed)
    }
}

enum PumpExit {
    /// Remote closed or errored; reconnect
    Lost(Option<String>),
    /// Every handle or the event receiver is gone
    Shutdown,
}

/// Owns the reconnect loop.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    url: String,
    credentials: Option<Credentials>,
    delay: Duration,
}

impl ConnectionManager {
    pub fn new(url: impl Into<String>, delay: Duration) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            delay,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Start the socket task.
    ///
    /// The task stops once every clone of the returned handle is dropped or
    /// once the event receiver is dropped, whether it is connected or waiting
    /// to reconnect. Aborting the join handle also stops it.
    pub fn spawn(
        self,
    ) -> (
        ChannelHandle,
        mpsc::UnboundedReceiver<ChannelEvent>,
        JoinHandle<()>,
    ) {
        let open = Arc::new(AtomicBool::new(false));
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = ChannelHandle {
            open: Arc::clone(&open),
            outbound: out_tx,
        };
        let task = tokio::spawn(self.run(open, out_rx, event_tx));
        (handle, event_rx, task)
    }

    async fn run(
        self,
        open: Arc<AtomicBool>,
        mut out_rx: mpsc::UnboundedReceiver<String>,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) {
        let mut scheduler = ReconnectScheduler::new(self.delay);

        loop {
            let exit = match self.connect().await {
                Ok(ws) => {
                    scheduler.on_open();
                    // anything queued while the link was down is stale
                    while out_rx.try_recv().is_ok() {}
                    open.store(true, Ordering::SeqCst);
                    info!(url = %self.url, "channel open");
                    if events.send(ChannelEvent::Opened).is_err() {
                        break;
                    }
                    let exit = pump(ws, &mut out_rx, &events).await;
                    open.store(false, Ordering::SeqCst);
                    exit
                }
                Err(e) => PumpExit::Lost(Some(e.to_string())),
            };

            let reason = match exit {
                PumpExit::Shutdown => break,
                PumpExit::Lost(reason) => reason,
            };
            if let Some(reason) = reason {
                warn!(url = %self.url, %reason, "channel error");
                if events.send(ChannelEvent::Error(reason)).is_err() {
                    break;
                }
            }

            if scheduler.on_close(Instant::now()) {
                let attempt = scheduler.attempts() + 1;
                info!(attempt, delay_ms = self.delay.as_millis() as u64, "channel lost, scheduling reconnect");
                if events
                    .send(ChannelEvent::Closed {
                        retry_in: self.delay,
                        attempt,
                    })
                    .is_err()
                {
                    break;
                }
            }
            if let Some(at) = scheduler.pending() {
                if !wait_for_retry(at, &mut out_rx, &events).await {
                    break;
                }
            }
            scheduler.take_due(Instant::now());
        }

        open.store(false, Ordering::SeqCst);
        debug!(url = %self.url, "channel task stopped");
    }

    async fn connect(&self) -> Result<WsStream> {
        let mut request = self.url.as_str().into_client_request()?;
        if let Some(creds) = &self.credentials {
            let value = HeaderValue::from_str(&creds.authorization_header())
                .map_err(|e| Error::InvalidInput(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        debug!(url = %self.url, "connecting");
        let (ws, _response) = connect_async(request).await?;
        Ok(ws)
    }
}

/// Sleep until a retry is due. Returns false if the console side went away
/// in the meantime. Messages sent while disconnected are dropped.
async fn wait_for_retry(
    at: Instant,
    out_rx: &mut mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) -> bool {
    let deadline = tokio::time::sleep_until(tokio::time::Instant::from_std(at));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => return true,
            _ = events.closed() => return false,
            out = out_rx.recv() => {
                if out.is_none() {
                    return false;
                }
            }
        }
    }
}

async fn pump(
    ws: WsStream,
    out_rx: &mut mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) -> PumpExit {
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(ChannelEvent::Frame(text)).is_err() {
                            return PumpExit::Shutdown;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            return PumpExit::Lost(Some(e.to_string()));
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return PumpExit::Lost(None),
                    Some(Err(e)) => return PumpExit::Lost(Some(e.to_string())),
                    _ => {}
                }
            }

            _ = events.closed() => {
                let _ = write.send(Message::Close(None)).await;
                return PumpExit::Shutdown;
            }

            out = out_rx.recv() => {
                match out {
                    Some(json) => {
                        debug!(%json, "sending control message");
                        if let Err(e) = write.send(Message::Text(json)).await {
                            return PumpExit::Lost(Some(e.to_string()));
                        }
                    }
                    None => {
                        let _ = write.send(Message::Close(None)).await;
                        return PumpExit::Shutdown;
                    }
                }
            }
        }
    }
}
