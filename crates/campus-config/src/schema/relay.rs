use serde::{Deserialize, Serialize};

/// Configuration for the relay server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address to bind, e.g. "0.0.0.0" or "127.0.0.1".
    pub bind: String,
    pub port: u16,
    /// Seconds a new socket has to send its hello frame (valid range: 1-60).
    pub hello_timeout: u32,
    /// Outbound frames queued per connection (valid range: 16-65536).
    pub session_queue: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8787,
            hello_timeout: 10,
            session_queue: 256,
        }
    }
}
