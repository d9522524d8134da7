//! Requests awaiting their acknowledgement, keyed by `ref`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use campus_common::AckPayload;
use tokio::sync::oneshot;

pub(crate) struct PendingAcks {
    next_ref: AtomicU64,
    waiters: Mutex<HashMap<u64, oneshot::Sender<AckPayload>>>,
}

impl PendingAcks {
    pub(crate) fn new() -> Self {
        Self {
            next_ref: AtomicU64::new(1),
            waiters: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate a fresh `ref` and the receiver its ack will arrive on.
    pub(crate) fn register(&self) -> (u64, oneshot::Receiver<AckPayload>) {
        let msg_ref = self.next_ref.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.lock().insert(msg_ref, tx);
        (msg_ref, rx)
    }

    /// Deliver an ack. Returns false if nobody is waiting for `msg_ref`.
    pub(crate) fn resolve(&self, msg_ref: u64, payload: AckPayload) -> bool {
        match self.lock().remove(&msg_ref) {
            Some(tx) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    /// Forget a request whose caller stopped waiting.
    pub(crate) fn cancel(&self, msg_ref: u64) {
        self.lock().remove(&msg_ref);
    }

    /// Drop every waiter; their receivers observe a closed channel.
    pub(crate) fn fail_all(&self) -> usize {
        let mut waiters = self.lock();
        let count = waiters.len();
        waiters.clear();
        count
    }

    /// Whether a caller is still waiting on `msg_ref`.
    pub(crate) fn contains(&self, msg_ref: u64) -> bool {
        self.lock().contains_key(&msg_ref)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<AckPayload>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_delivers_to_matching_ref() {
        let acks = PendingAcks::new();
        let (first, _rx1) = acks.register();
        let (second, rx2) = acks.register();
        assert_ne!(first, second);

        assert!(acks.resolve(second, AckPayload::failure("nope")));
        assert_eq!(rx2.await.unwrap(), AckPayload::failure("nope"));
        assert_eq!(acks.len(), 1);
    }

    #[test]
    fn unknown_ref_is_ignored() {
        let acks = PendingAcks::new();
        assert!(!acks.resolve(42, AckPayload::failure("late")));
    }

    #[tokio::test]
    async fn fail_all_closes_receivers() {
        let acks = PendingAcks::new();
        let (_, rx) = acks.register();
        assert_eq!(acks.fail_all(), 1);
        assert!(rx.await.is_err());
        assert_eq!(acks.len(), 0);
    }

    #[test]
    fn cancel_removes_waiter() {
        let acks = PendingAcks::new();
        let (msg_ref, _rx) = acks.register();
        acks.cancel(msg_ref);
        assert!(!acks.resolve(msg_ref, AckPayload::failure("late")));
    }

    #[test]
    fn contains_tracks_outstanding_refs() {
        let acks = PendingAcks::new();
        let (msg_ref, _rx) = acks.register();
        assert!(acks.contains(msg_ref));
        acks.cancel(msg_ref);
        assert!(!acks.contains(msg_ref));
    }
}
