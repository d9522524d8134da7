//! WebSocket transport to the campus relay.
//!
//! One background task owns the socket: it performs the bearer handshake,
//! forwards requests, resolves acknowledgements by `ref`, fans pushed events
//! out to subscriptions, sends heartbeats, and reconnects with backoff.

mod acks;
mod client;
mod connection;
mod handler;
mod subscription;
mod types;

pub use client::{RealtimeClient, RealtimeHandle};
pub use subscription::Subscription;
pub use types::{ConnectionState, RealtimeConfig};

#[cfg(test)]
pub(crate) use client::test_support;
