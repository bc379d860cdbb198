//! Client execution logic.

use tokio::net::TcpStream;

use crate::{
    config::ClientConfig,
    error::ClientError,
    formatter::{MessageFormatter, PROMPT},
    input::spawn_line_reader,
    session::{SessionEnd, run_session},
    ui::TerminalView,
};

/// Connect to the relay server and run one interactive session.
///
/// A connect failure is returned immediately; there is no retry.
pub async fn run_client(config: ClientConfig) -> Result<SessionEnd, ClientError> {
    let addr = config.server_addr();
    tracing::info!("Connecting to {}", addr);

    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.clone(),
            source,
        })?;
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!("Failed to set TCP_NODELAY: {}", e);
    }

    tracing::info!("Connected to chat server!");
    println!("{}", MessageFormatter::format_welcome(&addr));

    let input = spawn_line_reader(PROMPT);
    run_session(stream, config.codec(), input, TerminalView::new()).await
}
