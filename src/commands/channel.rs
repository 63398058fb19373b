//! Fire-and-forget control messages.
//!
//! Each command opens the live channel, sends exactly one message once the
//! link is up, then closes it. The backend does not acknowledge these.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ConsoleSettings;
use crate::console::{ChannelEvent, ConnectionManager};
use crate::protocol::{ControlMessage, RelayAction};
use crate::{Error, Result};

use super::Output;

/// Upper bound for flushing the message and closing the socket.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize)]
pub struct ControlSent {
    pub url: String,
    pub sent: Value,
}

impl Output for ControlSent {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let action = self
            .sent
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or("message");
        match self.sent.get("lane_index").and_then(Value::as_u64) {
            Some(i) => format!("Sent {} for lane {}", action, i + 1),
            None => format!("Sent {}", action),
        }
    }
}

/// Open the channel, send `message`, close.
pub async fn send_control(
    settings: &ConsoleSettings,
    message: ControlMessage,
    timeout: Duration,
) -> Result<ControlSent> {
    let url = settings.ws_url();
    let json = message.to_json()?;
    let manager = ConnectionManager::new(url.clone(), settings.reconnect_delay())
        .with_credentials(settings.credentials());
    let (handle, mut events, task) = manager.spawn();

    let opened = tokio::time::timeout(timeout, async {
        while let Some(event) = events.recv().await {
            match event {
                ChannelEvent::Opened => return true,
                ChannelEvent::Error(reason) => debug!(%reason, "waiting for channel"),
                _ => {}
            }
        }
        false
    })
    .await;

    if !matches!(opened, Ok(true)) {
        task.abort();
        return Err(Error::Timeout(format!(
            "could not open {} within {}s",
            url,
            timeout.as_secs()
        )));
    }

    handle.send(&message)?;
    // dropping the last handle makes the socket task flush, close and stop
    drop(handle);
    if tokio::time::timeout(CLOSE_GRACE, task).await.is_err() {
        debug!("channel did not close in time");
    }
    drop(events);

    Ok(ControlSent {
        url,
        sent: serde_json::from_str(&json)?,
    })
}

pub async fn count_reset(
    settings: &ConsoleSettings,
    lane_index: usize,
    timeout: Duration,
) -> Result<ControlSent> {
    send_control(settings, ControlMessage::ResetCount { lane_index }, timeout).await
}

pub async fn relay_test(
    settings: &ConsoleSettings,
    lane_index: usize,
    relay: RelayAction,
    timeout: Duration,
) -> Result<ControlSent> {
    let message = ControlMessage::TestRelay {
        lane_index,
        relay_action: relay,
    };
    send_control(settings, message, timeout).await
}

pub async fn relay_test_all(settings: &ConsoleSettings, timeout: Duration) -> Result<ControlSent> {
    send_control(settings, ControlMessage::TestAllRelays, timeout).await
}

pub async fn autotest(
    settings: &ConsoleSettings,
    enabled: bool,
    timeout: Duration,
) -> Result<ControlSent> {
    send_control(settings, ControlMessage::ToggleAutoTest { enabled }, timeout).await
}
