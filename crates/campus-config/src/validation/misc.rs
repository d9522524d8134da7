//! Range validation for the realtime, api, relay, and toast sections.

use crate::schema::CampusConfig;

use super::helpers::validate_range;

/// Validate realtime timings and buffer size.
pub(crate) fn validate_realtime(errors: &mut Vec<String>, config: &CampusConfig) {
    let rt = &config.realtime;
    validate_range(errors, "realtime.heartbeat_interval", rt.heartbeat_interval, 5, 300);
    validate_range(errors, "realtime.reconnect_delay", rt.reconnect_delay, 1, 60);
    validate_range(errors, "realtime.max_reconnect_delay", rt.max_reconnect_delay, 1, 600);
    validate_range(errors, "realtime.connect_timeout", rt.connect_timeout, 1, 120);
    validate_range(errors, "realtime.ack_timeout", rt.ack_timeout, 1, 300);
    validate_range(errors, "realtime.event_buffer", rt.event_buffer, 16, 65536);

    if rt.max_reconnect_delay < rt.reconnect_delay {
        errors.push(format!(
            "realtime.max_reconnect_delay = {} is below realtime.reconnect_delay = {}",
            rt.max_reconnect_delay, rt.reconnect_delay
        ));
    }
}

/// Validate REST client timing.
pub(crate) fn validate_api(errors: &mut Vec<String>, config: &CampusConfig) {
    validate_range(errors, "api.request_timeout", config.api.request_timeout, 1, 120);
}

/// Validate relay server settings.
pub(crate) fn validate_relay(errors: &mut Vec<String>, config: &CampusConfig) {
    if config.relay.port == 0 {
        errors.push("relay.port = 0 is not a valid listening port".into());
    }
    validate_range(errors, "relay.hello_timeout", config.relay.hello_timeout, 1, 60);
    validate_range(errors, "relay.session_queue", config.relay.session_queue, 16, 65536);
}

/// Validate toast queue size.
pub(crate) fn validate_toasts(errors: &mut Vec<String>, config: &CampusConfig) {
    validate_range(errors, "toasts.capacity", config.toasts.capacity, 1, 100);
}
