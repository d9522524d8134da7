//! URL and bind address validation.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;

use crate::schema::CampusConfig;

/// `ws://` or `wss://` followed by a host.
static WS_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^wss?://[^\s/?#]+").unwrap());

/// `http://` or `https://` followed by a host.
static HTTP_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/?#]+").unwrap());

pub(crate) fn is_ws_url(url: &str) -> bool {
    WS_URL_RE.is_match(url)
}

pub(crate) fn is_http_url(url: &str) -> bool {
    HTTP_URL_RE.is_match(url)
}

/// Validate the relay socket URL and the REST base URL.
pub(crate) fn validate_urls(errors: &mut Vec<String>, config: &CampusConfig) {
    if !is_ws_url(&config.realtime.url) {
        errors.push(format!(
            "realtime.url = {:?} must start with ws:// or wss://",
            config.realtime.url
        ));
    }
    if !is_http_url(&config.api.base_url) {
        errors.push(format!(
            "api.base_url = {:?} must start with http:// or https://",
            config.api.base_url
        ));
    }
}

/// Validate that the relay bind address is an IP literal.
pub(crate) fn validate_bind(errors: &mut Vec<String>, config: &CampusConfig) {
    if config.relay.bind.parse::<IpAddr>().is_err() {
        errors.push(format!(
            "relay.bind = {:?} is not an IP address",
            config.relay.bind
        ));
    }
}
