//! Sortline - operator console for a conveyor sorting line.
//!
//! This library mirrors the live state of a sorting-line backend (lanes,
//! sensors, relays, the sorting queue) and reconciles it into a retained view
//! document that a presentation layer can draw. It provides the `sortline`
//! CLI with its engine, its backend clients and its terminal console.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod models;
pub mod protocol;
pub mod tui;

/// Library-level error type for console operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// The live channel is not open; nothing was sent.
    #[error("Channel is not connected")]
    ChannelClosed,

    /// The backend answered 401.
    #[error("Authentication required")]
    AuthRequired,

    /// Non-success HTTP status without an explicit error message.
    #[error("Server error: {0}")]
    HttpStatus(u16),

    /// Explicit `error` field in a backend reply.
    #[error("{0}")]
    Api(String),

    /// Configuration payload rejected before submission.
    #[error("{0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, Error>;
