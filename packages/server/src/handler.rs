//! Client Handler: the per-connection receive loop.

use futures_util::StreamExt;
use relay_shared::frame::{Frame, FrameCodec};
use tokio::io::AsyncRead;
use tokio_util::{codec::FramedRead, sync::CancellationToken};

use crate::{
    broadcast::Broadcaster,
    connection::{CloseReason, ConnectionId},
};

/// Lifecycle of a connection as seen by its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Reading,
    Closing(CloseReason),
}

/// Reads frames from one peer and hands each message to the broadcaster.
///
/// The handler owns the read side of its socket exclusively. It holds the
/// connection's id and shutdown token, not the connection itself.
pub struct ClientHandler<R> {
    id: ConnectionId,
    reader: FramedRead<R, FrameCodec>,
    shutdown: CancellationToken,
    broadcaster: Broadcaster,
    state: ConnectionState,
}

impl<R> ClientHandler<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(
        id: ConnectionId,
        reader: FramedRead<R, FrameCodec>,
        shutdown: CancellationToken,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            id,
            reader,
            shutdown,
            broadcaster,
            state: ConnectionState::Connected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Run until the peer leaves or the connection is closed elsewhere, then
    /// evict this connection from the registry.
    pub async fn run(mut self) -> CloseReason {
        let reason = loop {
            self.state = ConnectionState::Reading;

            // Once closed, frames still buffered from this peer are dropped
            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break CloseReason::Evicted,
                next = self.reader.next() => next,
            };

            match next {
                Some(Ok(Frame::Message(payload))) => {
                    tracing::debug!(client_id = %self.id, bytes = payload.len(), "message received");
                    self.broadcaster.broadcast(payload, self.id).await;
                    self.state = ConnectionState::Connected;
                }
                Some(Ok(Frame::Close)) => break CloseReason::CloseFrame,
                Some(Err(e)) => {
                    tracing::warn!(client_id = %self.id, "Failed to read frame: {}", e);
                    break CloseReason::ReadError;
                }
                None => break CloseReason::PeerClosed,
            }
        };

        self.state = ConnectionState::Closing(reason);
        if !self.broadcaster.registry().evict(self.id, reason).await {
            tracing::debug!(client_id = %self.id, %reason, "handler stopped after connection was closed");
        }
        reason
    }
}
