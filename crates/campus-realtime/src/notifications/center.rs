use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::state::NotificationState;
use crate::api::NotificationApi;
use crate::error::RealtimeError;

/// The notification list for one user: polled once, then kept current by
/// pushes through a [`NotificationSubscriber`](super::NotificationSubscriber)
/// sharing the same [`state`](Self::state).
///
/// Marking read is optimistic. The local change lands first and the REST call
/// runs in the background; a failed call is logged and not rolled back.
pub struct NotificationCenter {
    user_id: String,
    state: Arc<RwLock<NotificationState>>,
    api: Arc<dyn NotificationApi>,
}

impl NotificationCenter {
    pub fn new(user_id: impl Into<String>, api: Arc<dyn NotificationApi>) -> Self {
        Self {
            user_id: user_id.into(),
            state: Arc::new(RwLock::new(NotificationState::default())),
            api,
        }
    }

    pub fn state(&self) -> Arc<RwLock<NotificationState>> {
        Arc::clone(&self.state)
    }

    /// Poll the list once and replace the held state.
    pub async fn load(&self) -> Result<usize, RealtimeError> {
        let items = self.api.list_notifications(&self.user_id).await?;
        let mut state = self.state.write().await;
        state.replace(items);
        info!(
            user_id = %self.user_id,
            total = state.items().len(),
            unread = state.unread_count(),
            "Notifications loaded"
        );
        Ok(state.items().len())
    }

    pub async fn unread_count(&self) -> usize {
        self.state.read().await.unread_count()
    }

    pub async fn mark_read(&self, id: &str) {
        let changed = self.state.write().await.mark_read(id);
        if !changed {
            return;
        }
        let api = Arc::clone(&self.api);
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = api.mark_notification_read(&id).await {
                warn!(id = %id, error = %e, "Failed to mark notification read");
            }
        });
    }

    pub async fn mark_all_read(&self) {
        self.state.write().await.mark_all_read();
        let api = Arc::clone(&self.api);
        let user_id = self.user_id.clone();
        tokio::spawn(async move {
            if let Err(e) = api.mark_all_notifications_read(&user_id).await {
                warn!(user_id = %user_id, error = %e, "Failed to mark all notifications read");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use campus_common::{Notification, NotificationKind};
    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct MockApi {
        items: Vec<Notification>,
        fail_writes: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationApi for MockApi {
        async fn list_notifications(&self, _user_id: &str) -> Result<Vec<Notification>, RealtimeError> {
            Ok(self.items.clone())
        }

        async fn mark_notification_read(&self, id: &str) -> Result<(), RealtimeError> {
            self.calls.lock().unwrap().push(format!("read:{id}"));
            if self.fail_writes {
                return Err(RealtimeError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(())
        }

        async fn mark_all_notifications_read(&self, user_id: &str) -> Result<(), RealtimeError> {
            self.calls.lock().unwrap().push(format!("read-all:{user_id}"));
            Ok(())
        }
    }

    fn notification(id: &str, is_read: bool) -> Notification {
        Notification {
            id: id.into(),
            kind: NotificationKind::System,
            content: "Welcome".into(),
            is_read,
            created_at: Utc::now(),
            user_id: "u1".into(),
            related_id: None,
        }
    }

    async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn load_replaces_state() {
        let api = Arc::new(MockApi {
            items: vec![notification("n1", false), notification("n2", true)],
            ..MockApi::default()
        });
        let center = NotificationCenter::new("u1", api);
        assert_eq!(center.load().await.unwrap(), 2);
        assert_eq!(center.unread_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_marks_never_go_negative() {
        let api = Arc::new(MockApi {
            items: vec![notification("n1", false)],
            ..MockApi::default()
        });
        let center = Arc::new(NotificationCenter::new("u1", api.clone()));
        center.load().await.unwrap();

        let a = {
            let center = Arc::clone(&center);
            tokio::spawn(async move { center.mark_read("n1").await })
        };
        let b = {
            let center = Arc::clone(&center);
            tokio::spawn(async move { center.mark_read("n1").await })
        };
        a.await.unwrap();
        b.await.unwrap();
        settle().await;

        assert_eq!(center.unread_count().await, 0);
        assert!(center.state().read().await.items()[0].is_read);
        assert_eq!(api.calls.lock().unwrap().as_slice(), ["read:n1"]);
    }

    #[tokio::test]
    async fn failed_write_keeps_optimistic_update() {
        let api = Arc::new(MockApi {
            items: vec![notification("n1", false)],
            fail_writes: true,
            ..MockApi::default()
        });
        let center = NotificationCenter::new("u1", api.clone());
        center.load().await.unwrap();

        center.mark_read("n1").await;
        settle().await;

        assert_eq!(center.unread_count().await, 0);
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_all_read_sends_one_request() {
        let api = Arc::new(MockApi {
            items: vec![notification("n1", false), notification("n2", false)],
            ..MockApi::default()
        });
        let center = NotificationCenter::new("u1", api.clone());
        center.load().await.unwrap();

        center.mark_all_read().await;
        settle().await;

        assert_eq!(center.unread_count().await, 0);
        assert_eq!(api.calls.lock().unwrap().as_slice(), ["read-all:u1"]);
    }
}
