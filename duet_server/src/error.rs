//! Error types for the signaling server

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that can occur during signaling
#[derive(Error, Debug)]
pub enum SignalingError {
    /// Failed to send message to peer
    #[error("Failed to send message: {0}")]
    SendError(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Socket error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from client requests
#[derive(Error, Debug)]
pub enum ClientRequestError {
    /// Connection was closed
    #[error("Connection closed")]
    Close,

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Event name the server does not route
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Unsupported message type
    #[error("Unsupported message type")]
    UnsupportedType,
}
