//! Session-scoped owner of the relay connection.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::identity::SessionIdentity;
use crate::realtime::{ConnectionState, RealtimeClient, RealtimeConfig, RealtimeHandle};

/// Holds at most one live connection, keyed by the signed-in user.
///
/// The manager lives exactly as long as the authenticated session; dropping
/// it closes the connection. State is published through one `watch` channel
/// that survives user switches, so observers never need to resubscribe.
pub struct ConnectionManager {
    config: RealtimeConfig,
    state: Arc<watch::Sender<ConnectionState>>,
    current: Option<RealtimeClient>,
}

impl ConnectionManager {
    pub fn new(config: RealtimeConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            state: Arc::new(state),
            current: None,
        }
    }

    /// Reconcile the connection with the current identity.
    ///
    /// Same user as the live connection: no-op. Different user: the old
    /// connection is closed before the new one opens. `None`: close.
    pub fn set_identity(&mut self, identity: Option<&SessionIdentity>) {
        match identity {
            Some(identity) => {
                if let Some(client) = &self.current {
                    if client.user_id() == identity.user_id && !client.handle().is_closed() {
                        return;
                    }
                }
                self.close_current();
                info!(user_id = %identity.user_id, "Opening relay connection");
                self.current = Some(RealtimeClient::spawn_with_state(
                    self.config.clone(),
                    identity,
                    Arc::clone(&self.state),
                ));
            }
            None => self.close_current(),
        }
    }

    pub fn sign_in(&mut self, identity: &SessionIdentity) {
        self.set_identity(Some(identity));
    }

    /// Close the connection. On return `is_connected()` is false and no
    /// subscription receives further events.
    pub fn sign_out(&mut self) {
        self.set_identity(None);
    }

    /// Handle to the live connection, if any.
    pub fn handle(&self) -> Option<RealtimeHandle> {
        self.current.as_ref().map(RealtimeClient::handle)
    }

    pub fn state(&self) -> ConnectionState {
        match &self.current {
            Some(client) => client.handle().state(),
            None => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn close_current(&mut self) {
        if let Some(client) = self.current.take() {
            info!(user_id = %client.user_id(), "Closing relay connection");
            client.close();
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nothing listens on port 1, so connections stay in `Connecting`.
    fn unreachable() -> RealtimeConfig {
        RealtimeConfig {
            url: "ws://127.0.0.1:1".into(),
            connect_timeout_secs: 1,
            ..RealtimeConfig::default()
        }
    }

    #[tokio::test]
    async fn sign_in_starts_connecting() {
        let mut manager = ConnectionManager::new(unreachable());
        let mut states = manager.watch_state();
        manager.sign_in(&SessionIdentity::new("u1", "Ada"));

        assert!(manager.handle().is_some());
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            states.wait_for(|s| *s == ConnectionState::Connecting),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn same_user_keeps_connection() {
        let mut manager = ConnectionManager::new(unreachable());
        let identity = SessionIdentity::new("u1", "Ada");
        manager.sign_in(&identity);
        let first = manager.handle().unwrap();

        manager.sign_in(&identity);
        assert!(!first.is_closed());
    }

    #[tokio::test]
    async fn switching_user_closes_old_connection() {
        let mut manager = ConnectionManager::new(unreachable());
        manager.sign_in(&SessionIdentity::new("u1", "Ada"));
        let first = manager.handle().unwrap();

        manager.sign_in(&SessionIdentity::new("u2", "Grace"));
        assert!(first.is_closed());
        assert_eq!(manager.handle().unwrap().user_id(), "u2");
    }

    #[tokio::test]
    async fn sign_out_disconnects_immediately() {
        let mut manager = ConnectionManager::new(unreachable());
        let states = manager.watch_state();
        manager.sign_in(&SessionIdentity::new("u1", "Ada"));
        let handle = manager.handle().unwrap();
        let mut sub = handle.subscribe();

        manager.sign_out();

        assert!(manager.handle().is_none());
        assert!(!manager.is_connected());
        assert_eq!(*states.borrow(), ConnectionState::Disconnected);
        assert_eq!(handle.state(), ConnectionState::Disconnected);
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropping_manager_closes_connection() {
        let mut manager = ConnectionManager::new(unreachable());
        manager.sign_in(&SessionIdentity::new("u1", "Ada"));
        let handle = manager.handle().unwrap();
        drop(manager);
        assert!(handle.is_closed());
    }
}
