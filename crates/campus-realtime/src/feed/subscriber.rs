use std::sync::Arc;

use campus_common::{FeedUpdate, Post, ServerEvent};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::state::FeedState;
use crate::realtime::RealtimeHandle;

/// Listens for `feed-update` pushes and applies them to a shared [`FeedState`].
///
/// The listener task is aborted on [`detach`](Self::detach) or drop. Events
/// arriving while detached are not buffered.
pub struct FeedSubscriber {
    state: Arc<RwLock<FeedState>>,
    changes: Arc<watch::Sender<u64>>,
    task: Option<JoinHandle<()>>,
}

impl FeedSubscriber {
    pub fn new(initial: FeedState) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(initial)),
            changes: Arc::new(changes),
            task: None,
        }
    }

    /// Start listening on `handle`, replacing any previous attachment.
    pub fn attach(&mut self, handle: &RealtimeHandle) {
        self.detach();

        // Subscribe before spawning so nothing pushed after `attach`
        // returns can slip past the listener.
        let mut subscription = handle.subscribe();
        let state = Arc::clone(&self.state);
        let changes = Arc::clone(&self.changes);
        let user_id = handle.user_id().to_string();

        self.task = Some(tokio::spawn(async move {
            debug!(user_id = %user_id, "Feed subscriber attached");
            while let Some(event) = subscription.recv().await {
                match event {
                    ServerEvent::FeedUpdate(update) => {
                        apply(&state, &changes, update).await;
                    }
                    ServerEvent::Notification(_) => {}
                }
            }
            debug!(user_id = %user_id, "Feed subscription ended");
        }));
    }

    pub fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Snapshot of the held posts, newest first.
    pub async fn posts(&self) -> Vec<Post> {
        self.state.read().await.posts().to_vec()
    }

    pub fn state(&self) -> Arc<RwLock<FeedState>> {
        Arc::clone(&self.state)
    }

    /// Counter bumped after every applied update.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

impl Default for FeedSubscriber {
    fn default() -> Self {
        Self::new(FeedState::default())
    }
}

impl Drop for FeedSubscriber {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn apply(state: &RwLock<FeedState>, changes: &watch::Sender<u64>, update: FeedUpdate) {
    trace!(post_id = %update.post_id(), "Applying feed update");
    let applied = state.write().await.apply(update);
    if applied {
        changes.send_modify(|n| *n += 1);
    }
}
