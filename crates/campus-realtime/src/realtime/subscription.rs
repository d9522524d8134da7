use campus_common::ServerEvent;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// A receiver of events pushed by the relay.
///
/// Yields `None` once the connection is closed. Closing wins over any event
/// still queued, so nothing is delivered after sign-out.
pub struct Subscription {
    rx: broadcast::Receiver<ServerEvent>,
    shutdown: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<ServerEvent>, shutdown: CancellationToken) -> Self {
        Self { rx, shutdown }
    }

    pub async fn recv(&mut self) -> Option<ServerEvent> {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return None,
                received = self.rx.recv() => match received {
                    Ok(event) => return Some(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Subscriber lagged; dropping missed events");
                    }
                    Err(RecvError::Closed) => return None,
                },
            }
        }
    }
}
