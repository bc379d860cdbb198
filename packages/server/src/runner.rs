//! Accept Loop and server lifecycle.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::FramedRead;

use crate::{
    broadcast::Broadcaster,
    config::ServerConfig,
    connection::CloseReason,
    error::ServerError,
    handler::ClientHandler,
    registry::Registry,
    writer::TcpPeerWriter,
};

/// Pause after a failed accept so a persistent fault (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// TCP broadcast relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::bind(ServerConfig::new("127.0.0.1", 5050)).await?;
/// server.run_until(shutdown_signal()).await;
/// ```
pub struct Server {
    config: ServerConfig,
    listener: TcpListener,
    broadcaster: Broadcaster,
}

impl Server {
    /// Bind the listening socket. A bind failure is fatal and reported here,
    /// before any connection is accepted.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr,
                source,
            })?;

        Ok(Self {
            config,
            listener,
            broadcaster: Broadcaster::new(Arc::new(Registry::new())),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.broadcaster.registry().clone()
    }

    /// Accept connections forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves, then close every
    /// registered connection.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = self.local_addr() {
            tracing::info!("Relay server listening on {}", addr);
        }
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.accept_connection(stream, peer).await,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        self.registry().close_all(CloseReason::Shutdown).await;
        tracing::info!("Server shutdown complete");
    }

    /// Register the socket and start its Client Handler.
    async fn accept_connection(&self, stream: TcpStream, peer: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%peer, "Failed to set TCP_NODELAY: {}", e);
        }

        let codec = self.config.codec();
        let (read_half, write_half) = stream.into_split();
        let writer = Arc::new(TcpPeerWriter::new(write_half, codec));
        let connection = self.registry().register(peer, writer).await;
        tracing::info!(client_id = %connection.id(), %peer, "connection accepted");

        let handler = ClientHandler::new(
            connection.id(),
            FramedRead::new(read_half, codec),
            connection.shutdown_token(),
            self.broadcaster.clone(),
        );
        tokio::spawn(handler.run());
    }
}
