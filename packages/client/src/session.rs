//! Client Session: concurrent send and receive over one connection.
//!
//! The receive activity owns the read half and the send activity owns the
//! write half. The view is the only state they share. When either one
//! finishes, the other is stopped and the session ends.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use relay_shared::frame::{Frame, FrameCodec, FrameError};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf},
    sync::mpsc,
};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::error::ClientError;

/// How long to keep rendering after a graceful close while the server tears
/// the connection down.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Where a session renders what it receives.
pub trait SessionView: Send {
    /// A broadcast from another client arrived
    fn show_message(&mut self, payload: &[u8]);

    /// A typed line was too long to send and was dropped
    fn show_rejected(&mut self, len: usize, max: usize);

    /// The server went away
    fn show_disconnected(&mut self, reason: &str);
}

/// How a session that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user left; a close frame was sent
    UserClosed,
}

/// Why the receive activity stopped.
enum ReceiveEnd {
    EndOfStream,
    Failed(FrameError),
}

type SharedView<V> = Arc<Mutex<V>>;

fn with_view<V>(view: &SharedView<V>, f: impl FnOnce(&mut V)) {
    // A panic while rendering must not silence the rest of the session
    let mut guard = view.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut *guard);
}

/// Run a session until the user leaves or the connection drops.
///
/// `input` yields the user's lines. An empty line, or the channel closing,
/// sends the zero-length close frame and ends the session gracefully. A line
/// longer than the codec's maximum frame length is reported through the view
/// and never sent.
pub async fn run_session<S, V>(
    stream: S,
    codec: FrameCodec,
    input: mpsc::UnboundedReceiver<String>,
    view: V,
) -> Result<SessionEnd, ClientError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    V: SessionView + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let reader = FramedRead::new(read_half, codec);
    let writer = FramedWrite::new(write_half, codec);
    let view: SharedView<V> = Arc::new(Mutex::new(view));

    let mut receive_task = tokio::spawn(receive_loop(reader, view.clone()));
    let mut send_task = tokio::spawn(send_loop(writer, input, view.clone()));

    tokio::select! {
        // A finished send means the user left, even if the server has already
        // closed its side in response
        biased;

        sent = &mut send_task => {
            match sent {
                Ok(Ok(())) => {
                    // Let anything already in flight render before leaving
                    if tokio::time::timeout(CLOSE_GRACE, &mut receive_task).await.is_err() {
                        receive_task.abort();
                    }
                    tracing::info!("Session closed by user");
                    Ok(SessionEnd::UserClosed)
                }
                Ok(Err(e)) => {
                    receive_task.abort();
                    tracing::warn!("Failed to send message: {}", e);
                    Err(e.into())
                }
                Err(e) => {
                    receive_task.abort();
                    tracing::error!("Send task failed: {}", e);
                    Err(e.into())
                }
            }
        }
        received = &mut receive_task => {
            send_task.abort();
            let error = match received {
                Ok(ReceiveEnd::EndOfStream) => {
                    ClientError::ConnectionLost("server closed the connection".to_string())
                }
                Ok(ReceiveEnd::Failed(e)) => e.into(),
                Err(e) => e.into(),
            };
            let reason = match &error {
                ClientError::ConnectionLost(reason) => reason.clone(),
                other => other.to_string(),
            };
            with_view(&view, |v| v.show_disconnected(&reason));
            tracing::warn!("Connection lost: {}", reason);
            Err(error)
        }
    }
}

async fn receive_loop<R, V>(
    mut reader: FramedRead<ReadHalf<R>, FrameCodec>,
    view: SharedView<V>,
) -> ReceiveEnd
where
    R: AsyncRead,
    V: SessionView,
{
    loop {
        match reader.next().await {
            Some(Ok(Frame::Message(payload))) => with_view(&view, |v| v.show_message(&payload)),
            Some(Ok(Frame::Close)) | None => break ReceiveEnd::EndOfStream,
            Some(Err(e)) => break ReceiveEnd::Failed(e),
        }
    }
}

async fn send_loop<W, V>(
    mut writer: FramedWrite<WriteHalf<W>, FrameCodec>,
    mut input: mpsc::UnboundedReceiver<String>,
    view: SharedView<V>,
) -> Result<(), FrameError>
where
    W: AsyncWrite,
    V: SessionView,
{
    let max = writer.encoder().max_frame_len();
    while let Some(line) = input.recv().await {
        if line.is_empty() {
            break;
        }
        if line.len() > max {
            tracing::warn!("Dropping {} byte line, maximum is {}", line.len(), max);
            with_view(&view, |v| v.show_rejected(line.len(), max));
            continue;
        }
        writer.send(Frame::from_payload(line)).await?;
    }

    writer.send(Frame::Close).await?;
    writer.get_mut().shutdown().await?;
    Ok(())
}
