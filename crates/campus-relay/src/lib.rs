//! campus-relay: WebSocket relay for the campus feed.
//!
//! Authenticates each connection with a bearer token, persists user actions
//! through a [`FeedStore`], acknowledges every request exactly once, and
//! pushes derived feed updates and notifications to the relevant sessions.

pub mod auth;
pub mod connection;
pub mod error;
pub mod service;
pub mod session;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use campus_config::RelayConfig;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;

pub use auth::{AuthenticatedUser, BearerIdentityValidator, TokenValidator};
pub use error::RelayError;
pub use service::RelayService;
pub use session::SessionStore;
pub use store::{FeedStore, InMemoryFeedStore};

use crate::connection::handle_connection;

/// Everything a connection task needs. Cheap to clone.
#[derive(Clone)]
pub struct RelayState {
    pub service: RelayService,
    pub validator: Arc<dyn TokenValidator>,
    pub hello_timeout: Duration,
    pub session_queue: usize,
}

impl RelayState {
    pub fn new(
        store: Arc<dyn FeedStore>,
        validator: Arc<dyn TokenValidator>,
        config: &RelayConfig,
    ) -> Self {
        Self {
            service: RelayService::new(store, SessionStore::new()),
            validator,
            hello_timeout: Duration::from_secs(u64::from(config.hello_timeout.max(1))),
            session_queue: config.session_queue as usize,
        }
    }

    /// In-memory store and the bearer-identity validator.
    pub fn in_memory(config: &RelayConfig) -> Self {
        Self::new(
            Arc::new(InMemoryFeedStore::new()),
            Arc::new(BearerIdentityValidator),
            config,
        )
    }

    pub fn sessions(&self) -> &SessionStore {
        self.service.sessions()
    }
}

/// Accept connections forever, one task per connection.
pub async fn serve(listener: TcpListener, state: RelayState) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = state.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, addr, state).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}
