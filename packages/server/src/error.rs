//! Error types for the relay server.

use thiserror::Error;

/// Server-specific errors. Only startup faults surface here; per-connection
/// faults are contained inside the connection that caused them.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The bound socket could not report its address
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}
