//! Public handles for the relay connection.

use std::sync::Arc;
use std::time::Duration;

use campus_common::{ClientRequest, ServerEvent};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::acks::PendingAcks;
use super::connection::connection_loop;
use super::subscription::Subscription;
use super::types::{ConnectionState, RealtimeCommand, RealtimeConfig};
use crate::error::RealtimeError;
use crate::identity::SessionIdentity;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared between handles and the connection task.
pub(crate) struct Shared {
    pub(crate) config: RealtimeConfig,
    pub(crate) user_id: String,
    pub(crate) command_tx: mpsc::Sender<RealtimeCommand>,
    pub(crate) events: broadcast::Sender<ServerEvent>,
    pub(crate) acks: PendingAcks,
    pub(crate) state: Arc<watch::Sender<ConnectionState>>,
    pub(crate) shutdown: CancellationToken,
}

impl Shared {
    /// Publish a state transition. Ignored once the client is closed, so a
    /// retired connection task can never overwrite its successor's state.
    pub(crate) fn publish_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            if self.shutdown.is_cancelled() || *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Owner of one relay connection.
///
/// Dropping the client closes the connection.
pub struct RealtimeClient {
    handle: RealtimeHandle,
    task: Option<JoinHandle<()>>,
}

impl RealtimeClient {
    /// Start the background connection for `identity`.
    pub fn connect(config: RealtimeConfig, identity: &SessionIdentity) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self::spawn_with_state(config, identity, Arc::new(state))
    }

    /// Start a connection that reports into an existing state channel.
    pub(crate) fn spawn_with_state(
        config: RealtimeConfig,
        identity: &SessionIdentity,
        state: Arc<watch::Sender<ConnectionState>>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        let shared = Arc::new(Shared {
            config,
            user_id: identity.user_id.clone(),
            command_tx,
            events,
            acks: PendingAcks::new(),
            state,
            shutdown: CancellationToken::new(),
        });

        let task = tokio::spawn(connection_loop(
            Arc::clone(&shared),
            identity.bearer_token(),
            command_rx,
        ));

        Self {
            handle: RealtimeHandle { shared },
            task: Some(task),
        }
    }

    pub fn handle(&self) -> RealtimeHandle {
        self.handle.clone()
    }

    pub fn user_id(&self) -> &str {
        self.handle.user_id()
    }

    /// Close the connection. Idempotent.
    ///
    /// On return the state reads `Disconnected`, every pending request has
    /// failed, and every subscription has stopped yielding events.
    pub fn close(&self) {
        let shared = &self.handle.shared;
        if shared.shutdown.is_cancelled() {
            return;
        }
        shared.shutdown.cancel();
        shared.state.send_replace(ConnectionState::Disconnected);
        let failed = shared.acks.fail_all();
        debug!(user_id = %shared.user_id, failed, "Realtime client closed");
    }

    /// Close and wait for the connection task to send its close frame.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RealtimeClient {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cheap, cloneable handle to a relay connection.
///
/// Handles outlive nothing: once the owning [`RealtimeClient`] closes, every
/// handle reports `Disconnected` and its requests fail.
#[derive(Clone)]
pub struct RealtimeHandle {
    pub(crate) shared: Arc<Shared>,
}

impl RealtimeHandle {
    pub fn user_id(&self) -> &str {
        &self.shared.user_id
    }

    pub fn state(&self) -> ConnectionState {
        if self.is_closed() {
            return ConnectionState::Disconnected;
        }
        *self.shared.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.shutdown.is_cancelled()
    }

    /// Subscribe to pushed events from this point on.
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.shared.events.subscribe(), self.shared.shutdown.clone())
    }

    /// Send a request and await its acknowledgement with the configured timeout.
    pub async fn request(&self, request: ClientRequest) -> Result<serde_json::Value, RealtimeError> {
        let after = self.shared.config.ack_timeout();
        self.request_with_timeout(request, after).await
    }

    /// Send a request and await its acknowledgement for at most `after`.
    pub async fn request_with_timeout(
        &self,
        request: ClientRequest,
        after: Duration,
    ) -> Result<serde_json::Value, RealtimeError> {
        if !self.is_connected() {
            return Err(RealtimeError::NotConnected);
        }

        let event = request.event_name();
        let (msg_ref, rx) = self.shared.acks.register();
        if self
            .shared
            .command_tx
            .send(RealtimeCommand::Request { msg_ref, request })
            .await
            .is_err()
        {
            self.shared.acks.cancel(msg_ref);
            return Err(RealtimeError::Disconnected);
        }

        match tokio::time::timeout(after, rx).await {
            Ok(Ok(payload)) => payload.into_result().map_err(RealtimeError::Rejected),
            Ok(Err(_)) => Err(RealtimeError::Disconnected),
            Err(_) => {
                self.shared.acks.cancel(msg_ref);
                Err(RealtimeError::Timeout { event, after })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
