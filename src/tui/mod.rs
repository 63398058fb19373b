//! Terminal console for Sortline
//!
//! A keyboard-driven front end over the [`crate::console`] engine: it draws
//! the view document, routes key presses through the command dispatcher and
//! shows the log and QR overlay.

#[cfg(feature = "tui")]
mod app;
#[cfg(feature = "tui")]
mod theme;
#[cfg(feature = "tui")]
mod views;

#[cfg(feature = "tui")]
pub use app::{KeyOutcome, Page, TuiApp, run_tui};
#[cfg(feature = "tui")]
pub use theme::tone_color;
