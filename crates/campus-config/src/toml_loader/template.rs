//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Campus realtime configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[realtime]
# url = "ws://127.0.0.1:8787"
# heartbeat_interval = 25     # seconds, 5-300
# reconnect_delay = 1         # seconds, 1-60
# max_reconnect_delay = 30    # seconds, 1-600
# connect_timeout = 15        # seconds, 1-120
# ack_timeout = 10            # seconds, 1-300
# event_buffer = 256          # 16-65536

[api]
# base_url = "http://127.0.0.1:3000"
# request_timeout = 15        # seconds, 1-120

[relay]
# bind = "0.0.0.0"
# port = 8787
# hello_timeout = 10          # seconds, 1-60
# session_queue = 256         # 16-65536

[toasts]
# capacity = 16               # 1-100

[logging]
# level = "INFO"              # TRACE, DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
