//! Terminal client for the relay chat server.
//!
//! A session runs two activities over one TCP connection: one sends the lines
//! the user types, the other renders broadcasts from other clients.

pub mod config;
pub mod error;
pub mod formatter;
pub mod input;
pub mod runner;
pub mod session;
pub mod ui;

pub use config::ClientConfig;
pub use error::ClientError;
pub use runner::run_client;
pub use session::{SessionEnd, SessionView, run_session};
