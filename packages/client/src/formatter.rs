//! Message formatting utilities for client display.

use relay_shared::time::format_local_time_of_day;

/// Prompt shown while waiting for input
pub const PROMPT: &str = "> ";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Banner printed once the connection is up
    pub fn format_welcome(server_addr: &str) -> String {
        format!(
            "\nConnected to {}. Type messages and press Enter to send. \
             Press Enter on an empty line to leave.\n",
            server_addr
        )
    }

    /// Format a broadcast received from another client.
    ///
    /// The payload is interpreted as UTF-8; invalid sequences are replaced
    /// rather than rejected.
    pub fn format_incoming(payload: &[u8], received_at: i64) -> String {
        format!(
            "\n[{}] {}\n",
            format_local_time_of_day(received_at),
            String::from_utf8_lossy(payload)
        )
    }

    /// Format the notice shown when a typed line exceeds the frame limit
    pub fn format_rejected(len: usize, max: usize) -> String {
        format!(
            "\n*** Message not sent: {} bytes exceeds the {} byte limit ***\n",
            len, max
        )
    }

    /// Format the notice shown when the server goes away
    pub fn format_disconnected(reason: &str) -> String {
        format!("\n*** Disconnected from server: {} ***\n", reason)
    }
}
