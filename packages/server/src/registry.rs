//! Connection Registry.
//!
//! The only structure mutated by more than one task. The lock is held for the
//! duration of a map mutation or copy and never across network I/O; fan-out
//! iterates over an isolated [`Registry::snapshot`] instead of the live map.

use std::{
    collections::BTreeMap,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::sync::Mutex;

use crate::{
    connection::{CloseReason, Connection, ConnectionId},
    writer::PeerWriter,
};

/// Thread-safe set of live connections keyed by [`ConnectionId`].
///
/// Identifiers are handed out from a monotonic counter starting at 1, so the
/// map's key order is also registration order.
pub struct Registry {
    next_id: AtomicU64,
    connections: Mutex<BTreeMap<ConnectionId, Arc<Connection>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connections: Mutex::new(BTreeMap::new()),
        }
    }

    /// Assign a fresh identifier and insert the connection.
    pub async fn register(
        &self,
        peer_addr: SocketAddr,
        writer: Arc<dyn PeerWriter>,
    ) -> Arc<Connection> {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let connection = Arc::new(Connection::new(id, peer_addr, writer));
        self.connections
            .lock()
            .await
            .insert(id, connection.clone());
        connection
    }

    /// Remove the connection if present. Removing an absent id is a no-op.
    pub async fn remove(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.lock().await.remove(&id)
    }

    /// Point-in-time copy of the registered connections in registration order.
    pub async fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.lock().await.values().cloned().collect()
    }

    /// Remove the connection and close its socket.
    ///
    /// The entry leaves the map before the socket is closed, and only the
    /// caller that actually removed it performs the close. Returns `false`
    /// when the id was already gone.
    pub async fn evict(&self, id: ConnectionId, reason: CloseReason) -> bool {
        let Some(connection) = self.remove(id).await else {
            return false;
        };
        connection.close().await;

        if reason.is_error() {
            tracing::warn!(client_id = %id, peer = %connection.peer_addr(), %reason, "connection closed");
        } else {
            tracing::info!(client_id = %id, peer = %connection.peer_addr(), %reason, "connection closed");
        }
        true
    }

    /// Evict every registered connection.
    pub async fn close_all(&self, reason: CloseReason) {
        let drained = std::mem::take(&mut *self.connections.lock().await);
        for (id, connection) in drained {
            connection.close().await;
            tracing::info!(client_id = %id, %reason, "connection closed");
        }
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
