//! Terminal rendering for the client.

use std::io::Write;

use relay_shared::time::{Clock, SystemClock};

use crate::{
    formatter::{MessageFormatter, PROMPT},
    session::SessionView,
};

/// Redisplay the prompt after printing something over it
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}

/// [`SessionView`] that prints to stdout.
pub struct TerminalView<C = SystemClock> {
    clock: C,
}

impl TerminalView {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionView for TerminalView<C> {
    fn show_message(&mut self, payload: &[u8]) {
        print!(
            "{}",
            MessageFormatter::format_incoming(payload, self.clock.now_millis())
        );
        redisplay_prompt();
    }

    fn show_rejected(&mut self, len: usize, max: usize) {
        print!("{}", MessageFormatter::format_rejected(len, max));
        redisplay_prompt();
    }

    fn show_disconnected(&mut self, reason: &str) {
        println!("{}", MessageFormatter::format_disconnected(reason));
    }
}
