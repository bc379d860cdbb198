//! TCP broadcast relay server.
//!
//! Accepts concurrent TCP peers and relays every message a peer sends to all
//! other connected peers, using the length-prefixed framing from
//! [`relay_shared::frame`].

pub mod broadcast;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod registry;
pub mod runner;
pub mod signal;
pub mod writer;

pub use broadcast::{BroadcastReport, Broadcaster};
pub use config::ServerConfig;
pub use connection::{CloseReason, Connection, ConnectionId};
pub use error::ServerError;
pub use handler::{ClientHandler, ConnectionState};
pub use registry::Registry;
pub use runner::Server;
pub use writer::{PeerWriter, TcpPeerWriter};
