//! A single accepted peer.

use std::{
    fmt, io,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use relay_shared::frame::{Frame, FrameError};
use tokio_util::sync::CancellationToken;

use crate::writer::PeerWriter;

/// Stable identifier of a connection, assigned once by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client-{}", self.0)
    }
}

/// Why a connection left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// End of stream without a close frame
    PeerClosed,
    /// Zero-length frame received
    CloseFrame,
    /// Read or decode failure
    ReadError,
    /// Write failure while broadcasting to this peer
    WriteError,
    /// The connection was closed by another component while its handler was
    /// still reading
    Evicted,
    /// Operator shutdown
    Shutdown,
}

impl CloseReason {
    pub fn is_error(&self) -> bool {
        matches!(self, CloseReason::ReadError | CloseReason::WriteError)
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CloseReason::PeerClosed => "peer closed",
            CloseReason::CloseFrame => "close frame",
            CloseReason::ReadError => "read error",
            CloseReason::WriteError => "write error",
            CloseReason::Evicted => "evicted",
            CloseReason::Shutdown => "shutdown",
        };
        f.write_str(reason)
    }
}

/// One accepted peer: identifier, address, write path and the token that
/// stops its handler.
pub struct Connection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    writer: Arc<dyn PeerWriter>,
    shutdown: CancellationToken,
    closed: AtomicBool,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        peer_addr: SocketAddr,
        writer: Arc<dyn PeerWriter>,
    ) -> Self {
        Self {
            id,
            peer_addr,
            writer,
            shutdown: CancellationToken::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Token cancelled when this connection is closed.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Write one frame. A write still pending when the connection is closed
    /// is abandoned, releasing the per-connection write lock.
    pub async fn send(&self, frame: Frame) -> Result<(), FrameError> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                Err(io::Error::from(io::ErrorKind::NotConnected).into())
            }
            result = self.writer.send(frame) => result,
        }
    }

    /// Close the socket and stop the handler. Only the first call has any
    /// effect.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shutdown.cancel();
        self.writer.close().await;
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use relay_shared::frame::FrameCodec;
    use tokio::{io::duplex, time::timeout};

    use super::*;
    use crate::writer::{MockPeerWriter, TcpPeerWriter};

    fn test_addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn test_connection_id_display() {
        // テスト項目: ConnectionId は Client-<n> 形式で表示される
        // given (前提条件):
        let id = ConnectionId::new(3);

        // when (操作) / then (期待する結果):
        assert_eq!(id.to_string(), "Client-3");
        assert_eq!(id.value(), 3);
    }

    #[test]
    fn test_close_reason_error_classification() {
        // テスト項目: 読み書きの失敗だけがエラー扱いになる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert!(CloseReason::ReadError.is_error());
        assert!(CloseReason::WriteError.is_error());
        assert!(!CloseReason::PeerClosed.is_error());
        assert!(!CloseReason::CloseFrame.is_error());
        assert!(!CloseReason::Shutdown.is_error());
    }

    #[tokio::test]
    async fn test_close_runs_once_and_cancels_token() {
        // テスト項目: close を複数回呼んでもソケットのクローズは 1 回だけ
        // given (前提条件):
        let mut writer = MockPeerWriter::new();
        writer.expect_close().times(1).returning(|| ());
        let connection = Connection::new(ConnectionId::new(1), test_addr(), Arc::new(writer));
        let token = connection.shutdown_token();

        // when (操作):
        connection.close().await;
        connection.close().await;

        // then (期待する結果):
        assert!(connection.is_closed());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_close_is_not_blocked_by_stalled_send() {
        // テスト項目: 相手が読まずに書き込みが詰まっていても close は完了し、送信はエラーで戻る
        // given (前提条件):
        let (local, _never_read) = duplex(64);
        let writer = Arc::new(TcpPeerWriter::new(local, FrameCodec::default()));
        let connection = Arc::new(Connection::new(ConnectionId::new(1), test_addr(), writer));
        let sender = connection.clone();
        let pending = tokio::spawn(async move {
            sender.send(Frame::from_payload(vec![b'x'; 4096])).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // when (操作):
        let closed = timeout(Duration::from_secs(2), connection.close()).await;

        // then (期待する結果):
        assert!(closed.is_ok(), "close waited on the stalled write");
        let result = timeout(Duration::from_secs(2), pending).await.unwrap().unwrap();
        assert!(matches!(result, Err(FrameError::Io(_))));
    }

    #[tokio::test]
    async fn test_send_after_close_fails_without_writing() {
        // テスト項目: クローズ済みの接続への send は書き込まずにエラーになる
        // given (前提条件):
        let mut writer = MockPeerWriter::new();
        writer.expect_send().never();
        writer.expect_close().times(1).returning(|| ());
        let connection = Connection::new(ConnectionId::new(1), test_addr(), Arc::new(writer));
        connection.close().await;

        // when (操作):
        let result = connection.send(Frame::from_payload("late")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(FrameError::Io(_))));
    }
}
