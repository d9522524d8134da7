//! Client-side connection settings: the realtime socket and the REST API.

use serde::{Deserialize, Serialize};

/// Realtime socket configuration. Durations are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// WebSocket URL of the relay.
    pub url: String,
    /// Ping interval (valid range: 5-300).
    pub heartbeat_interval: u32,
    /// First reconnect delay (valid range: 1-60).
    pub reconnect_delay: u32,
    /// Reconnect backoff cap (valid range: 1-600, not below `reconnect_delay`).
    pub max_reconnect_delay: u32,
    /// Socket open + handshake timeout (valid range: 1-120).
    pub connect_timeout: u32,
    /// How long an emitted action waits for its acknowledgement (valid range: 1-300).
    pub ack_timeout: u32,
    /// Inbound events buffered per subscriber before it lags (valid range: 16-65536).
    pub event_buffer: u32,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8787".into(),
            heartbeat_interval: 25,
            reconnect_delay: 1,
            max_reconnect_delay: 30,
            connect_timeout: 15,
            ack_timeout: 10,
            event_buffer: 256,
        }
    }
}

/// REST API used for profiles and notification CRUD.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout in seconds (valid range: 1-120).
    pub request_timeout: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".into(),
            request_timeout: 15,
        }
    }
}
