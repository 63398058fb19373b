//! Transient QR overlay.
//!
//! Single slot: each trigger replaces the text, tone and hide deadline of the
//! previous one. Time is passed in so callers (and tests) control the clock.

use std::time::{Duration, Instant};

use super::document::Tone;

/// Delay between a trigger and the overlay becoming visible.
pub const OVERLAY_SHOW_DELAY: Duration = Duration::from_millis(10);

/// How long after the latest trigger the overlay hides.
pub const OVERLAY_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone)]
struct Slot {
    text: String,
    tone: Tone,
    triggered_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct QrOverlay {
    slot: Option<Slot>,
}

impl QrOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, text: impl Into<String>, tone: Tone, now: Instant) {
        self.slot = Some(Slot {
            text: text.into(),
            tone,
            triggered_at: now,
        });
    }

    /// Text and tone if the overlay is on screen at `now`.
    pub fn visible(&self, now: Instant) -> Option<(&str, Tone)> {
        let slot = self.slot.as_ref()?;
        let shown_at = slot.triggered_at + OVERLAY_SHOW_DELAY;
        let hidden_at = slot.triggered_at + OVERLAY_DURATION;
        if now >= shown_at && now < hidden_at {
            Some((slot.text.as_str(), slot.tone))
        } else {
            None
        }
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.slot
            .as_ref()
            .map(|slot| slot.triggered_at + OVERLAY_DURATION)
    }

    /// Drop the slot once its deadline passed.
    pub fn expire(&mut self, now: Instant) {
        if self.hide_deadline().is_some_and(|deadline| now >= deadline) {
            self.slot = None;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }
}
