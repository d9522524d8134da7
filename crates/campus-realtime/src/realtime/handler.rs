//! Inbound frame dispatch.

use campus_common::{ServerEvent, ServerFrame};
use tracing::{debug, trace, warn};

use super::client::Shared;

/// Handle one text frame from the relay.
///
/// Acks resolve their pending request; pushes fan out to subscriptions.
/// Malformed frames are logged and dropped.
pub(crate) fn handle_server_text(shared: &Shared, text: &str) {
    let frame = match serde_json::from_str::<ServerFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, text = %text, "Unrecognized frame from relay");
            return;
        }
    };

    match frame {
        ServerFrame::Ack { msg_ref, payload } => {
            if !shared.acks.resolve(msg_ref, payload) {
                debug!(msg_ref, "Ack for a request nobody is waiting on");
            }
        }
        ServerFrame::FeedUpdate { payload } => publish(shared, ServerEvent::FeedUpdate(payload)),
        ServerFrame::Notification { payload } => {
            publish(shared, ServerEvent::Notification(payload))
        }
        ServerFrame::Pong => trace!("Pong from relay"),
        ServerFrame::Error { message } => warn!(message = %message, "Relay reported an error"),
        ServerFrame::SessionReady { user_id } => {
            debug!(user_id = %user_id, "Duplicate session_ready ignored");
        }
    }
}

fn publish(shared: &Shared, event: ServerEvent) {
    if shared.shutdown.is_cancelled() {
        return;
    }
    // No receivers is normal before any subscriber attaches.
    let _ = shared.events.send(event);
}
