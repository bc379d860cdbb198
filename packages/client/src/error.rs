//! Error types for the relay client.

use relay_shared::frame::FrameError;
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The initial connection could not be established
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server ended the connection or sent something undecodable
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Reading from or writing to the established connection failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A session task panicked or was cancelled
    #[error("session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<FrameError> for ClientError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Io(e) => ClientError::Io(e),
            other => ClientError::ConnectionLost(other.to_string()),
        }
    }
}
