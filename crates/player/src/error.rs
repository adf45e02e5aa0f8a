//! Errors surfaced by the player session.

use crate::application::{ChoiceError, Ineligible};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The transport is not open; nothing was sent or queued.
    #[error("Not connected")]
    NotConnected,

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Rejected locally; the action never reached the server.
    #[error("Action not allowed: {0}")]
    Ineligible(#[from] Ineligible),

    #[error("Invalid executive choice: {0}")]
    Choice(#[from] ChoiceError),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The driver task has stopped and no longer accepts commands.
    #[error("Session closed")]
    SessionClosed,
}
