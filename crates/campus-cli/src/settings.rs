//! Mapping from the config file onto client-side settings.

use std::time::Duration;

use campus_config::CampusConfig;
use campus_realtime::RealtimeConfig;

pub fn realtime_config(config: &CampusConfig) -> RealtimeConfig {
    let rt = &config.realtime;
    RealtimeConfig {
        url: rt.url.clone(),
        heartbeat_interval_secs: u64::from(rt.heartbeat_interval),
        reconnect_delay_secs: u64::from(rt.reconnect_delay),
        max_reconnect_delay_secs: u64::from(rt.max_reconnect_delay),
        connect_timeout_secs: u64::from(rt.connect_timeout),
        ack_timeout_secs: u64::from(rt.ack_timeout),
        event_buffer: rt.event_buffer as usize,
    }
}

pub fn api_timeout(config: &CampusConfig) -> Duration {
    Duration::from_secs(u64::from(config.api.request_timeout.max(1)))
}
