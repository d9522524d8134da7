//! Session store: maps user ids to their live connections.

use std::collections::HashMap;
use std::sync::Arc;

use campus_common::ConnectionId;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Outbound queue of one connection. Frames are pre-serialized JSON.
pub type Outbox = mpsc::Sender<String>;

/// Thread-safe session store. A user may hold several connections at once.
#[derive(Clone, Default)]
pub struct SessionStore {
    users: Arc<RwLock<HashMap<String, HashMap<ConnectionId, Outbox>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, user_id: &str, conn_id: ConnectionId, tx: Outbox) {
        self.users
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(conn_id, tx);
    }

    /// Remove one connection. Returns true if it was the user's last.
    pub async fn unregister(&self, user_id: &str, conn_id: &ConnectionId) -> bool {
        let mut users = self.users.write().await;
        let Some(conns) = users.get_mut(user_id) else {
            return false;
        };
        conns.remove(conn_id);
        if conns.is_empty() {
            users.remove(user_id);
            return true;
        }
        false
    }

    /// Queue a frame on every connection of `user_id`. Returns how many
    /// connections accepted it.
    pub async fn send_to_user(&self, user_id: &str, frame: &str) -> usize {
        let targets: Vec<(ConnectionId, Outbox)> = {
            let users = self.users.read().await;
            match users.get(user_id) {
                Some(conns) => conns.iter().map(|(id, tx)| (id.clone(), tx.clone())).collect(),
                None => return 0,
            }
        };
        deliver(targets, frame)
    }

    /// Queue a frame on every connection except `origin`.
    pub async fn broadcast_except(&self, origin: &ConnectionId, frame: &str) -> usize {
        let targets: Vec<(ConnectionId, Outbox)> = {
            let users = self.users.read().await;
            users
                .values()
                .flat_map(|conns| conns.iter())
                .filter(|(id, _)| *id != origin)
                .map(|(id, tx)| (id.clone(), tx.clone()))
                .collect()
        };
        deliver(targets, frame)
    }

    /// Number of users with at least one connection.
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.users.read().await.values().map(HashMap::len).sum()
    }
}

/// Enqueue without waiting. A full queue drops the frame for that connection
/// only; best-effort delivery has no backfill.
fn deliver(targets: Vec<(ConnectionId, Outbox)>, frame: &str) -> usize {
    let mut delivered = 0;
    for (conn_id, tx) in targets {
        match tx.try_send(frame.to_string()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(conn = %conn_id, "Outbound queue full; dropping frame");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(conn = %conn_id, "Connection closed before delivery");
            }
        }
    }
    delivered
}
