//! Outbound side of a peer connection.
//!
//! The Broadcast Engine only ever talks to peers through [`PeerWriter`], so
//! it stays independent of the socket type. [`TcpPeerWriter`] is the real
//! implementation; it serializes writes with a per-connection lock so two
//! concurrent broadcasts can never interleave partial frames on one socket.

use async_trait::async_trait;
use futures_util::SinkExt;
use relay_shared::frame::{Frame, FrameCodec, FrameError};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::tcp::OwnedWriteHalf,
    sync::Mutex,
};
use tokio_util::codec::FramedWrite;

/// Write path of one peer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PeerWriter: Send + Sync {
    /// Write one complete frame to the peer.
    async fn send(&self, frame: Frame) -> Result<(), FrameError>;

    /// Shut down the write direction. Errors are swallowed; the peer is gone
    /// either way.
    async fn close(&self);
}

/// [`PeerWriter`] over the write half of a TCP stream.
pub struct TcpPeerWriter<W = OwnedWriteHalf> {
    sink: Mutex<FramedWrite<W, FrameCodec>>,
}

impl<W> TcpPeerWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(io: W, codec: FrameCodec) -> Self {
        Self {
            sink: Mutex::new(FramedWrite::new(io, codec)),
        }
    }
}

#[async_trait]
impl<W> PeerWriter for TcpPeerWriter<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&self, frame: Frame) -> Result<(), FrameError> {
        let mut sink = self.sink.lock().await;
        sink.send(frame).await
    }

    async fn close(&self) {
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.get_mut().shutdown().await {
            tracing::debug!("Write half shutdown failed: {}", e);
        }
    }
}
