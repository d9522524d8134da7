//! Request dispatch: persist, acknowledge, and fan out derived events.

use std::sync::Arc;

use campus_common::{
    AckPayload, ClientRequest, ConnectionId, FeedUpdate, Notification, NotificationKind,
    ServerEvent, ServerFrame,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::AuthenticatedUser;
use crate::error::RelayError;
use crate::session::SessionStore;
use crate::store::FeedStore;

/// Serialize a frame for an outbox.
pub(crate) fn encode(frame: &ServerFrame) -> Result<String, RelayError> {
    serde_json::to_string(frame).map_err(|e| RelayError::Internal(e.to_string()))
}

#[derive(Clone)]
pub struct RelayService {
    store: Arc<dyn FeedStore>,
    sessions: SessionStore,
}

impl RelayService {
    pub fn new(store: Arc<dyn FeedStore>, sessions: SessionStore) -> Self {
        Self { store, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn store(&self) -> &Arc<dyn FeedStore> {
        &self.store
    }

    /// Handle one request from `origin`. The returned payload is the single
    /// acknowledgement; derived events are queued before it is returned.
    pub async fn handle_request(
        &self,
        origin: &ConnectionId,
        user: &AuthenticatedUser,
        request: ClientRequest,
    ) -> AckPayload {
        let event = request.event_name();
        let result = match request {
            ClientRequest::CreatePost(draft) => self.create_post(origin, user, draft).await,
            ClientRequest::LikePost(like) => self.like_post(origin, user, &like.post_id).await,
            ClientRequest::AddComment(comment) => {
                self.add_comment(origin, user, &comment.post_id, &comment.content)
                    .await
            }
        };

        match result {
            Ok(ack) => ack,
            Err(e) => {
                if let RelayError::Internal(detail) = &e {
                    warn!(event, user_id = %user.user_id, detail = %detail, "Request failed");
                } else {
                    debug!(event, user_id = %user.user_id, error = %e, "Request rejected");
                }
                AckPayload::failure(e.to_string())
            }
        }
    }

    async fn create_post(
        &self,
        origin: &ConnectionId,
        user: &AuthenticatedUser,
        draft: campus_common::CreatePost,
    ) -> Result<AckPayload, RelayError> {
        let post = self.store.create_post(user, draft).await?;
        info!(post_id = %post.id, author = %user.user_id, "Post created");

        let ack = success(&post)?;
        self.broadcast_feed(origin, FeedUpdate::NewPost { post }).await?;
        Ok(ack)
    }

    async fn like_post(
        &self,
        origin: &ConnectionId,
        user: &AuthenticatedUser,
        post_id: &str,
    ) -> Result<AckPayload, RelayError> {
        let outcome = self.store.like_post(user, post_id).await?;
        debug!(post_id, likes = outcome.receipt.likes, "Post liked");

        self.broadcast_feed(
            origin,
            FeedUpdate::NewLike {
                post_id: post_id.to_string(),
            },
        )
        .await?;
        self.notify_author(
            &outcome.post_author_id,
            user,
            NotificationKind::Like,
            format!("{} liked your post", user.display_name),
            post_id,
        )
        .await?;
        success(&outcome.receipt)
    }

    async fn add_comment(
        &self,
        origin: &ConnectionId,
        user: &AuthenticatedUser,
        post_id: &str,
        content: &str,
    ) -> Result<AckPayload, RelayError> {
        let outcome = self.store.add_comment(user, post_id, content).await?;
        debug!(post_id, comment_id = %outcome.comment.id, "Comment added");

        let ack = success(&outcome.comment)?;
        self.broadcast_feed(
            origin,
            FeedUpdate::NewComment {
                post_id: post_id.to_string(),
                comment: outcome.comment,
            },
        )
        .await?;
        self.notify_author(
            &outcome.post_author_id,
            user,
            NotificationKind::Comment,
            format!("{} commented on your post", user.display_name),
            post_id,
        )
        .await?;
        Ok(ack)
    }

    async fn broadcast_feed(&self, origin: &ConnectionId, update: FeedUpdate) -> Result<(), RelayError> {
        let frame = encode(&ServerFrame::from(ServerEvent::FeedUpdate(update)))?;
        let delivered = self.sessions.broadcast_except(origin, &frame).await;
        debug!(delivered, "Feed update broadcast");
        Ok(())
    }

    /// Store and push a notification to the post author, unless the author
    /// is the one acting.
    async fn notify_author(
        &self,
        author_id: &str,
        actor: &AuthenticatedUser,
        kind: NotificationKind,
        content: String,
        post_id: &str,
    ) -> Result<Option<Notification>, RelayError> {
        if author_id == actor.user_id {
            return Ok(None);
        }
        let notification = self
            .store
            .create_notification(author_id, kind, content, Some(post_id.to_string()))
            .await?;
        let frame = encode(&ServerFrame::from(ServerEvent::Notification(
            notification.clone(),
        )))?;
        let delivered = self.sessions.send_to_user(author_id, &frame).await;
        debug!(user_id = %author_id, delivered, "Notification pushed");
        Ok(Some(notification))
    }
}

fn success<T: Serialize>(value: &T) -> Result<AckPayload, RelayError> {
    AckPayload::success(value).map_err(|e| RelayError::Internal(e.to_string()))
}
