//! Wire protocol between the relay and its clients.
//!
//! Every frame is a JSON text frame tagged by `type`. Requests carry a
//! numeric `ref` that the relay echoes in exactly one `ack`.

use serde::{Deserialize, Serialize};

use crate::model::{Comment, Notification, Post};

// ---------------------------------------------------------------------------
// Client -> relay
// ---------------------------------------------------------------------------

/// Frames a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// First frame on every connection. `token` is a bearer-style string.
    Hello { token: String },

    /// A user action awaiting one acknowledgement.
    Request {
        #[serde(rename = "ref")]
        msg_ref: u64,
        request: ClientRequest,
    },

    Ping,
}

/// User actions, keyed by event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ClientRequest {
    CreatePost(CreatePost),
    LikePost(LikePost),
    AddComment(AddComment),
}

impl ClientRequest {
    /// Event name as it appears on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::CreatePost(_) => "create-post",
            Self::LikePost(_) => "like-post",
            Self::AddComment(_) => "add-comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePost {
    pub content: String,
    pub department: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikePost {
    pub post_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddComment {
    pub post_id: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Relay -> client
// ---------------------------------------------------------------------------

/// Frames the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Handshake accepted.
    SessionReady {
        #[serde(rename = "userId")]
        user_id: String,
    },

    /// The single acknowledgement for request `ref`.
    Ack {
        #[serde(rename = "ref")]
        msg_ref: u64,
        payload: AckPayload,
    },

    #[serde(rename = "feed-update")]
    FeedUpdate { payload: FeedUpdate },

    #[serde(rename = "notification")]
    Notification { payload: Notification },

    /// Connection-level failure, e.g. a rejected handshake.
    Error { message: String },

    Pong,
}

/// Acknowledgement body: success fields, or an `error` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AckPayload {
    Failure { error: String },
    Success(serde_json::Value),
}

impl AckPayload {
    pub fn success<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Success)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }

    pub fn into_result(self) -> Result<serde_json::Value, String> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure { error } => Err(error),
        }
    }
}

/// Feed change pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FeedUpdate {
    NewPost {
        post: Post,
    },
    NewComment {
        #[serde(rename = "postId")]
        post_id: String,
        comment: Comment,
    },
    NewLike {
        #[serde(rename = "postId")]
        post_id: String,
    },
}

impl FeedUpdate {
    /// Id of the post this update touches.
    pub fn post_id(&self) -> &str {
        match self {
            Self::NewPost { post } => &post.id,
            Self::NewComment { post_id, .. } | Self::NewLike { post_id } => post_id,
        }
    }
}

/// Pushed events, detached from their wire frames.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    FeedUpdate(FeedUpdate),
    Notification(Notification),
}

impl From<ServerEvent> for ServerFrame {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::FeedUpdate(payload) => Self::FeedUpdate { payload },
            ServerEvent::Notification(payload) => Self::Notification { payload },
        }
    }
}
