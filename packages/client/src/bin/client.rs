//! TCP chat client.
//!
//! Connects to a relay server, sends each typed line to every other client
//! and prints what the others send. An empty line leaves the chat.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin relay-client
//! cargo run --bin relay-client -- --host 192.168.0.10 --port 3000
//! ```

use clap::Parser;
use relay_client::{ClientConfig, run_client};
use relay_shared::{frame::DEFAULT_MAX_FRAME_LEN, logger::setup_logger};

#[derive(Parser, Debug)]
#[command(name = "relay-client")]
#[command(about = "TCP chat client that sends typed lines and shows broadcasts", long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to connect to
    #[arg(short = 'p', long, default_value = "5050")]
    port: u16,

    /// Largest message payload in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_LEN)]
    max_frame_len: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ClientConfig {
        host: args.host,
        port: args.port,
        max_frame_len: args.max_frame_len,
    };

    match run_client(config).await {
        Ok(_) => {
            tracing::info!("Client session ended normally");
            // The readline thread may still be blocked on stdin
            std::process::exit(0);
        }
        Err(e) => {
            tracing::error!("Client error: {}", e);
            std::process::exit(1);
        }
    }
}
