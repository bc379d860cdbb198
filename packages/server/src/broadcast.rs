//! Broadcast Engine: fan-out of one message to every other connection.

use std::sync::Arc;

use bytes::Bytes;
use relay_shared::frame::Frame;

use crate::{
    connection::{CloseReason, ConnectionId},
    registry::Registry,
};

/// Outcome of one [`Broadcaster::broadcast`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients the frame was written to, in registration order
    pub delivered: Vec<ConnectionId>,
    /// Recipients whose write failed and who were evicted by this call.
    /// A recipient already removed by another task is not listed.
    pub evicted: Vec<ConnectionId>,
}

/// Relays messages to all registered connections except the sender.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Write `payload` to every connection in a fresh snapshot whose id is not
    /// `sender_id`.
    ///
    /// A failed write evicts that recipient and delivery continues with the
    /// rest. Every write attempt has finished when this returns. An empty
    /// payload is the close signal on the wire, so it is never relayed.
    pub async fn broadcast(&self, payload: Bytes, sender_id: ConnectionId) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        if payload.is_empty() {
            return report;
        }

        let bytes = payload.len();
        let frame = Frame::Message(payload);

        for connection in self.registry.snapshot().await {
            let id = connection.id();
            if id == sender_id {
                continue;
            }

            match connection.send(frame.clone()).await {
                Ok(()) => report.delivered.push(id),
                Err(e) => {
                    tracing::warn!(client_id = %id, "Failed to relay message: {}", e);
                    if self.registry.evict(id, CloseReason::WriteError).await {
                        report.evicted.push(id);
                    }
                }
            }
        }

        tracing::debug!(
            client_id = %sender_id,
            bytes,
            recipients = report.delivered.len(),
            "message relayed"
        );
        report
    }
}
