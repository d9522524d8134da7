//! Configuration, connection state, and command types for the realtime client.

use std::time::Duration;

use campus_common::ClientRequest;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to the relay.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// WebSocket URL, e.g. `ws://127.0.0.1:8787`.
    pub url: String,
    /// Ping interval in seconds (default: 25).
    pub heartbeat_interval_secs: u64,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
    /// Socket open + handshake timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Acknowledgement timeout for emitted actions, in seconds.
    pub ack_timeout_secs: u64,
    /// Pushed events buffered per subscription.
    pub event_buffer: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8787".into(),
            heartbeat_interval_secs: 25,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
            connect_timeout_secs: 15,
            ack_timeout_secs: 10,
            event_buffer: 256,
        }
    }
}

impl RealtimeConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ack_timeout_secs.max(1))
    }

    pub(crate) fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs.max(1))
    }

    pub(crate) fn max_reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.max_reconnect_delay_secs.max(self.reconnect_delay_secs).max(1))
    }
}

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// Lifecycle of one relay connection.
///
/// `Disconnected -> Connecting -> Connected -> Disconnected`. While the
/// transport retries after a drop the state sits in `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands sent from handles to the connection task.
#[derive(Debug)]
pub(crate) enum RealtimeCommand {
    Request { msg_ref: u64, request: ClientRequest },
}
