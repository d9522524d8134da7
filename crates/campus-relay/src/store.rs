//! Persistence seam for posts, comments, likes, and notifications.

use async_trait::async_trait;
use campus_common::{
    new_id, Comment, CreatePost, LikeReceipt, Notification, NotificationKind, Post,
};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::auth::AuthenticatedUser;
use crate::error::RelayError;

/// A like as recorded, plus who owns the liked post.
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    pub receipt: LikeReceipt,
    pub post_author_id: String,
}

/// A stored comment, plus who owns the commented post.
#[derive(Debug, Clone)]
pub struct CommentOutcome {
    pub comment: Comment,
    pub post_author_id: String,
}

#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn create_post(&self, author: &AuthenticatedUser, post: CreatePost) -> Result<Post, RelayError>;

    async fn like_post(&self, user: &AuthenticatedUser, post_id: &str) -> Result<LikeOutcome, RelayError>;

    async fn add_comment(
        &self,
        author: &AuthenticatedUser,
        post_id: &str,
        content: &str,
    ) -> Result<CommentOutcome, RelayError>;

    async fn create_notification(
        &self,
        user_id: &str,
        kind: NotificationKind,
        content: String,
        related_id: Option<String>,
    ) -> Result<Notification, RelayError>;

    /// Posts, newest first.
    async fn posts(&self) -> Vec<Post>;

    /// Notifications owned by `user_id`, newest first.
    async fn notifications_for(&self, user_id: &str) -> Vec<Notification>;
}

#[derive(Default)]
struct Inner {
    posts: Vec<Post>,
    notifications: Vec<Notification>,
}

/// Process-local store. Data lives as long as the relay.
#[derive(Default)]
pub struct InMemoryFeedStore {
    inner: RwLock<Inner>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn create_post(&self, author: &AuthenticatedUser, post: CreatePost) -> Result<Post, RelayError> {
        if post.content.trim().is_empty() {
            return Err(RelayError::ContentRequired);
        }
        if post.department.trim().is_empty() {
            return Err(RelayError::DepartmentRequired);
        }

        let post = Post {
            id: new_id(),
            author_id: author.user_id.clone(),
            author_name: author.display_name.clone(),
            content: post.content,
            department: post.department,
            image: post.image.filter(|url| !url.is_empty()),
            likes: 0,
            comments: Vec::new(),
            created_at: Utc::now(),
        };
        self.inner.write().await.posts.insert(0, post.clone());
        Ok(post)
    }

    async fn like_post(&self, _user: &AuthenticatedUser, post_id: &str) -> Result<LikeOutcome, RelayError> {
        let mut inner = self.inner.write().await;
        let post = inner
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(RelayError::PostNotFound)?;
        post.likes = post.likes.saturating_add(1);
        Ok(LikeOutcome {
            receipt: LikeReceipt {
                post_id: post.id.clone(),
                likes: post.likes,
            },
            post_author_id: post.author_id.clone(),
        })
    }

    async fn add_comment(
        &self,
        author: &AuthenticatedUser,
        post_id: &str,
        content: &str,
    ) -> Result<CommentOutcome, RelayError> {
        if content.trim().is_empty() {
            return Err(RelayError::ContentRequired);
        }
        let mut inner = self.inner.write().await;
        let post = inner
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(RelayError::PostNotFound)?;

        let comment = Comment {
            id: new_id(),
            post_id: post.id.clone(),
            author_id: author.user_id.clone(),
            author_name: author.display_name.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        post.comments.push(comment.clone());
        Ok(CommentOutcome {
            comment,
            post_author_id: post.author_id.clone(),
        })
    }

    async fn create_notification(
        &self,
        user_id: &str,
        kind: NotificationKind,
        content: String,
        related_id: Option<String>,
    ) -> Result<Notification, RelayError> {
        let notification = Notification {
            id: new_id(),
            kind,
            content,
            is_read: false,
            created_at: Utc::now(),
            user_id: user_id.to_string(),
            related_id,
        };
        self.inner
            .write()
            .await
            .notifications
            .insert(0, notification.clone());
        Ok(notification)
    }

    async fn posts(&self) -> Vec<Post> {
        self.inner.read().await.posts.clone()
    }

    async fn notifications_for(&self, user_id: &str) -> Vec<Notification> {
        self.inner
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: id.into(),
            display_name: id.to_uppercase(),
        }
    }

    fn draft(content: &str, department: &str) -> CreatePost {
        CreatePost {
            content: content.into(),
            department: department.into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn create_post_validates_fields_in_order() {
        let store = InMemoryFeedStore::new();
        let author = user("u1");
        assert_eq!(
            store.create_post(&author, draft(" ", "")).await.unwrap_err(),
            RelayError::ContentRequired
        );
        assert_eq!(
            store.create_post(&author, draft("hello", "")).await.unwrap_err(),
            RelayError::DepartmentRequired
        );
        assert!(store.posts().await.is_empty());
    }

    #[tokio::test]
    async fn newest_post_is_first() {
        let store = InMemoryFeedStore::new();
        let author = user("u1");
        store.create_post(&author, draft("one", "CS")).await.unwrap();
        let second = store.create_post(&author, draft("two", "CS")).await.unwrap();

        let posts = store.posts().await;
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, second.id);
        assert_eq!(second.author_name, "U1");
    }

    #[tokio::test]
    async fn like_increments_and_reports_author() {
        let store = InMemoryFeedStore::new();
        let post = store.create_post(&user("u1"), draft("hello", "CS")).await.unwrap();

        store.like_post(&user("u2"), &post.id).await.unwrap();
        let outcome = store.like_post(&user("u3"), &post.id).await.unwrap();

        assert_eq!(outcome.receipt.likes, 2);
        assert_eq!(outcome.post_author_id, "u1");
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let store = InMemoryFeedStore::new();
        assert_eq!(
            store.like_post(&user("u2"), "missing").await.unwrap_err(),
            RelayError::PostNotFound
        );
        assert_eq!(
            store.add_comment(&user("u2"), "missing", "hi").await.unwrap_err(),
            RelayError::PostNotFound
        );
    }

    #[tokio::test]
    async fn comment_is_attached_to_post() {
        let store = InMemoryFeedStore::new();
        let post = store.create_post(&user("u1"), draft("hello", "CS")).await.unwrap();
        let outcome = store.add_comment(&user("u2"), &post.id, "nice").await.unwrap();

        assert_eq!(outcome.comment.post_id, post.id);
        assert_eq!(store.posts().await[0].comments.len(), 1);
    }

    #[tokio::test]
    async fn notifications_are_filtered_by_owner() {
        let store = InMemoryFeedStore::new();
        store
            .create_notification("u1", NotificationKind::Like, "liked".into(), None)
            .await
            .unwrap();
        store
            .create_notification("u2", NotificationKind::System, "hi".into(), None)
            .await
            .unwrap();

        let mine = store.notifications_for("u1").await;
        assert_eq!(mine.len(), 1);
        assert!(!mine[0].is_read);
    }
}
