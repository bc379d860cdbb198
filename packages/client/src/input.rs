//! Line input from the terminal.

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

/// Read lines on a dedicated thread and forward them over a channel.
///
/// Empty lines are forwarded too; they mean "leave". Ctrl+C, Ctrl+D or a
/// readline failure drop the sender, which the session treats the same way.
pub fn spawn_line_reader(prompt: &str) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = prompt.to_string();

    // rustyline is synchronous, so it gets its own thread
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let leaving = line.is_empty();
                    if !leaving {
                        rl.add_history_entry(line.as_str()).ok();
                    }
                    if input_tx.send(line).is_err() || leaving {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
