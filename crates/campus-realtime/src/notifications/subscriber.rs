use std::sync::Arc;

use campus_common::{Notification, ServerEvent, Toast, ToastQueue};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::state::NotificationState;
use crate::realtime::RealtimeHandle;

/// Listens for `notification` pushes: prepends them to the shared state and
/// raises an info toast for each.
pub struct NotificationSubscriber {
    state: Arc<RwLock<NotificationState>>,
    toasts: Arc<Mutex<ToastQueue>>,
    changes: Arc<watch::Sender<u64>>,
    task: Option<JoinHandle<()>>,
}

impl NotificationSubscriber {
    pub fn new(state: Arc<RwLock<NotificationState>>, toasts: Arc<Mutex<ToastQueue>>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state,
            toasts,
            changes: Arc::new(changes),
            task: None,
        }
    }

    pub fn attach(&mut self, handle: &RealtimeHandle) {
        self.detach();

        let mut subscription = handle.subscribe();
        let state = Arc::clone(&self.state);
        let toasts = Arc::clone(&self.toasts);
        let changes = Arc::clone(&self.changes);

        self.task = Some(tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                match event {
                    ServerEvent::Notification(notification) => {
                        receive(&state, &toasts, notification).await;
                        changes.send_modify(|n| *n += 1);
                    }
                    ServerEvent::FeedUpdate(_) => {}
                }
            }
            debug!("Notification subscription ended");
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

    /// Counter bumped after every received notification.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

impl Drop for NotificationSubscriber {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn receive(
    state: &RwLock<NotificationState>,
    toasts: &Mutex<ToastQueue>,
    notification: Notification,
) {
    info!(id = %notification.id, kind = notification.kind.as_str(), "Notification received");
    let toast = Toast::info("New notification", notification.content.clone());
    state.write().await.push(notification);
    toasts.lock().await.push(toast);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::realtime::test_support::{connected_handle, push};
    use campus_common::{NotificationKind, ToastLevel};
    use chrono::Utc;

    #[tokio::test]
    async fn push_updates_list_counter_and_toasts() {
        let (handle, _commands) = connected_handle();
        let state = Arc::new(RwLock::new(NotificationState::default()));
        let toasts = Arc::new(Mutex::new(ToastQueue::default()));
        let mut subscriber = NotificationSubscriber::new(Arc::clone(&state), Arc::clone(&toasts));
        let mut changes = subscriber.changes();
        subscriber.attach(&handle);

        push(
            &handle,
            ServerEvent::Notification(Notification {
                id: "n1".into(),
                kind: NotificationKind::Comment,
                content: "Grace commented on your post".into(),
                is_read: false,
                created_at: Utc::now(),
                user_id: "u1".into(),
                related_id: Some("p1".into()),
            }),
        );
        tokio::time::timeout(Duration::from_secs(1), changes.wait_for(|n| *n >= 1))
            .await
            .unwrap()
            .unwrap();

        let state = state.read().await;
        assert_eq!(state.items()[0].id, "n1");
        assert_eq!(state.unread_count(), 1);

        let mut toasts = toasts.lock().await;
        let shown = toasts.visible();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].level, ToastLevel::Info);
        assert_eq!(shown[0].body, "Grace commented on your post");
    }
}
