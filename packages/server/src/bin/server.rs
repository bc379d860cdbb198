//! TCP broadcast chat server.
//!
//! Relays every message a client sends to all other connected clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin relay-server
//! cargo run --bin relay-server -- --host 0.0.0.0 --port 3000
//! ```

use clap::Parser;
use relay_server::{Server, ServerConfig, signal::shutdown_signal};
use relay_shared::{frame::DEFAULT_MAX_FRAME_LEN, logger::setup_logger};

#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(about = "TCP chat server that relays each message to every other client", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "5050")]
    port: u16,

    /// Largest message payload in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_LEN)]
    max_frame_len: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        max_frame_len: args.max_frame_len,
    };

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Press Ctrl+C to shutdown gracefully");

    server.run_until(shutdown_signal()).await;
}
