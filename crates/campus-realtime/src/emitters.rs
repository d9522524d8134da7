//! User actions sent over the relay connection.
//!
//! Each action is one request and one acknowledgement. The acknowledgement
//! either decodes into the created record or carries the relay's error
//! message, surfaced verbatim as [`RealtimeError::Rejected`].

use campus_common::{
    AddComment, ClientRequest, Comment, CreatePost, LikePost, LikeReceipt, Post,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RealtimeError;
use crate::realtime::RealtimeHandle;

impl RealtimeHandle {
    /// Publish a post. Resolves with the post as stored by the relay.
    pub async fn create_post(&self, post: CreatePost) -> Result<Post, RealtimeError> {
        self.emit(ClientRequest::CreatePost(post)).await
    }

    /// Like a post. Resolves with the post's new like count.
    pub async fn like_post(&self, post_id: &str) -> Result<LikeReceipt, RealtimeError> {
        self.emit(ClientRequest::LikePost(LikePost {
            post_id: post_id.to_string(),
        }))
        .await
    }

    /// Comment on a post. Resolves with the stored comment.
    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, RealtimeError> {
        self.emit(ClientRequest::AddComment(AddComment {
            post_id: post_id.to_string(),
            content: content.to_string(),
        }))
        .await
    }

    async fn emit<T: DeserializeOwned>(&self, request: ClientRequest) -> Result<T, RealtimeError> {
        let event = request.event_name();
        let value = self.request(request).await?;
        serde_json::from_value(value).map_err(|e| {
            debug!(event, error = %e, "Ack did not match the expected shape");
            RealtimeError::Protocol(format!("{event} ack: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use campus_common::AckPayload;
    use serde_json::json;

    use crate::realtime::test_support::{ack, close, connected_handle, RealtimeCommand};
    use crate::realtime::RealtimeHandle;
    use crate::RealtimeError;

    use super::*;

    /// Answer the next request with `payload`.
    fn respond_with(
        handle: &RealtimeHandle,
        mut commands: tokio::sync::mpsc::Receiver<RealtimeCommand>,
        payload: AckPayload,
    ) -> tokio::task::JoinHandle<ClientRequest> {
        let responder = handle.clone();
        tokio::spawn(async move {
            let RealtimeCommand::Request { msg_ref, request } = commands.recv().await.unwrap();
            ack(&responder, msg_ref, payload);
            request
        })
    }

    fn hello_post() -> CreatePost {
        CreatePost {
            content: "hello".into(),
            department: "CS".into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn create_post_resolves_with_created_post() {
        let (handle, commands) = connected_handle();
        let ack_body = json!({
            "id": "p1",
            "authorId": "u1",
            "authorName": "Ada",
            "content": "hello",
            "department": "CS",
            "likes": 0,
            "comments": [],
            "createdAt": "2024-03-01T10:00:00Z"
        });
        let responder = respond_with(&handle, commands, AckPayload::Success(ack_body));

        let post = handle.create_post(hello_post()).await.unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.content, "hello");
        assert_eq!(post.department, "CS");

        let sent = responder.await.unwrap();
        assert_eq!(sent, ClientRequest::CreatePost(hello_post()));
    }

    #[tokio::test]
    async fn create_post_rejection_carries_exact_message() {
        let (handle, commands) = connected_handle();
        let _responder = respond_with(&handle, commands, AckPayload::failure("Department required"));

        let err = handle.create_post(hello_post()).await.unwrap_err();
        assert!(matches!(err, RealtimeError::Rejected(_)));
        assert_eq!(err.to_string(), "Department required");
    }

    #[tokio::test]
    async fn like_post_decodes_receipt() {
        let (handle, commands) = connected_handle();
        let _responder = respond_with(
            &handle,
            commands,
            AckPayload::Success(json!({"postId": "p1", "likes": 4})),
        );

        let receipt = handle.like_post("p1").await.unwrap();
        assert_eq!(receipt.post_id, "p1");
        assert_eq!(receipt.likes, 4);
    }

    #[tokio::test]
    async fn add_comment_with_wrong_shape_is_protocol_error() {
        let (handle, commands) = connected_handle();
        let _responder = respond_with(&handle, commands, AckPayload::Success(json!({"ok": true})));

        let err = handle.add_comment("p1", "nice").await.unwrap_err();
        assert!(matches!(err, RealtimeError::Protocol(_)));
    }

    #[tokio::test]
    async fn unanswered_request_times_out() {
        let (handle, _commands) = connected_handle();
        let err = handle
            .request_with_timeout(
                ClientRequest::LikePost(LikePost {
                    post_id: "p1".into(),
                }),
                Duration::from_millis(20),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RealtimeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn emitting_while_disconnected_fails_fast() {
        let (handle, _commands) = connected_handle();
        close(&handle);
        let err = handle.like_post("p1").await.unwrap_err();
        assert!(matches!(err, RealtimeError::NotConnected));
    }
}
