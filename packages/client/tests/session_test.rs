//! Integration tests running client sessions against an in-process relay server.

use std::{sync::Arc, time::Duration};

use relay_client::{ClientConfig, ClientError, SessionEnd, SessionView, run_client, run_session};
use relay_server::{Registry, Server, ServerConfig};
use relay_shared::frame::FrameCodec;
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{sleep, timeout},
};

const WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, PartialEq)]
enum ViewEvent {
    Message(String),
    Rejected(usize),
    Disconnected,
}

/// Forwards everything the session renders to the test
struct ChannelView(mpsc::UnboundedSender<ViewEvent>);

impl SessionView for ChannelView {
    fn show_message(&mut self, payload: &[u8]) {
        let _ = self
            .0
            .send(ViewEvent::Message(String::from_utf8_lossy(payload).into_owned()));
    }

    fn show_rejected(&mut self, len: usize, _max: usize) {
        let _ = self.0.send(ViewEvent::Rejected(len));
    }

    fn show_disconnected(&mut self, _reason: &str) {
        let _ = self.0.send(ViewEvent::Disconnected);
    }
}

/// Helper struct to manage one client session
struct TestClient {
    input: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedReceiver<ViewEvent>,
    session: JoinHandle<Result<SessionEnd, ClientError>>,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr, registry: &Registry) -> Self {
        Self::connect_with_codec(addr, registry, FrameCodec::default()).await
    }

    async fn connect_with_codec(
        addr: std::net::SocketAddr,
        registry: &Registry,
        codec: FrameCodec,
    ) -> Self {
        let expected = registry.len().await + 1;
        let stream = TcpStream::connect(addr).await.expect("Failed to connect");
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = tokio::spawn(run_session(
            stream,
            codec,
            input_rx,
            ChannelView(event_tx),
        ));
        wait_for_peers(registry, expected).await;

        TestClient {
            input: input_tx,
            events: event_rx,
            session,
        }
    }

    fn type_line(&self, line: &str) {
        self.input.send(line.to_string()).unwrap();
    }

    async fn next_event(&mut self) -> Option<ViewEvent> {
        timeout(WAIT, self.events.recv())
            .await
            .expect("timed out waiting for view event")
    }
}

async fn wait_for_peers(registry: &Registry, expected: usize) {
    timeout(WAIT, async {
        while registry.len().await != expected {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("registry never reached {} peers", expected));
}

async fn start_server() -> (std::net::SocketAddr, Arc<Registry>, oneshot::Sender<()>) {
    let server = Server::bind(ServerConfig::new("127.0.0.1", 0))
        .await
        .expect("Failed to bind server");
    let addr = server.local_addr().unwrap();
    let registry = server.registry();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));
    (addr, registry, tx)
}

#[tokio::test]
async fn test_typed_line_reaches_other_client() {
    // テスト項目: alice が入力した行が bob の画面に表示される
    // given (前提条件):
    let (addr, registry, _shutdown) = start_server().await;
    let alice = TestClient::connect(addr, &registry).await;
    let mut bob = TestClient::connect(addr, &registry).await;

    // when (操作):
    alice.type_line("hello bob");

    // then (期待する結果):
    assert_eq!(
        bob.next_event().await,
        Some(ViewEvent::Message("hello bob".to_string()))
    );
}

#[tokio::test]
async fn test_oversized_line_is_rejected_locally() {
    // テスト項目: 上限を超える行はクライアント側で破棄され、接続は維持される
    // given (前提条件):
    let (addr, registry, _shutdown) = start_server().await;
    let mut alice = TestClient::connect_with_codec(addr, &registry, FrameCodec::new(16)).await;
    let mut bob = TestClient::connect(addr, &registry).await;
    let long_line = "x".repeat(17);

    // when (操作):
    alice.type_line(&long_line);
    alice.type_line("short");

    // then (期待する結果):
    assert_eq!(alice.next_event().await, Some(ViewEvent::Rejected(17)));
    assert_eq!(
        bob.next_event().await,
        Some(ViewEvent::Message("short".to_string()))
    );
    assert_eq!(registry.len().await, 2);
    assert!(!alice.session.is_finished());
}

#[tokio::test]
async fn test_empty_line_leaves_and_is_evicted() {
    // テスト項目: 空行で退出するとセッションは正常終了し、サーバから退去する
    // given (前提条件):
    let (addr, registry, _shutdown) = start_server().await;
    let mut alice = TestClient::connect(addr, &registry).await;
    let mut bob = TestClient::connect(addr, &registry).await;

    // when (操作):
    alice.type_line("");
    let result = timeout(WAIT, alice.session).await.unwrap().unwrap();
    wait_for_peers(&registry, 1).await;
    bob.type_line("anyone?");

    // then (期待する結果):
    assert_eq!(result.unwrap(), SessionEnd::UserClosed);
    assert_eq!(alice.events.recv().await, None);
    // the sender never hears its own message
    assert!(
        timeout(Duration::from_millis(200), bob.events.recv())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_server_shutdown_ends_session_with_notice() {
    // テスト項目: サーバが停止するとセッションは切断通知を出して ConnectionLost で終わる
    // given (前提条件):
    let (addr, registry, shutdown) = start_server().await;
    let mut alice = TestClient::connect(addr, &registry).await;

    // when (操作):
    shutdown.send(()).unwrap();
    let result = timeout(WAIT, &mut alice.session).await.unwrap().unwrap();

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::ConnectionLost(_))));
    assert_eq!(alice.next_event().await, Some(ViewEvent::Disconnected));
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    // テスト項目: 接続できないアドレスへの接続は Connect エラーになる
    // given (前提条件):
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    // when (操作):
    let result = run_client(ClientConfig::new("127.0.0.1", port)).await;

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::Connect { .. })));
}
