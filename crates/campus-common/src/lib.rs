pub mod errors;
pub mod id;
pub mod model;
pub mod protocol;
pub mod toast;

pub use errors::{CampusError, ConfigError};
pub use id::{new_id, ConnectionId};
pub use model::{Comment, LikeReceipt, Notification, NotificationKind, Post, UserProfile};
pub use protocol::{
    AckPayload, AddComment, ClientFrame, ClientRequest, CreatePost, FeedUpdate, LikePost,
    ServerEvent, ServerFrame,
};
pub use toast::{Toast, ToastLevel, ToastQueue};

pub type Result<T> = std::result::Result<T, CampusError>;
