//! Client side of the campus realtime layer.
//!
//! A [`ConnectionManager`] owns at most one live relay connection for the
//! signed-in user. Feed and notification subscribers attach to its
//! [`RealtimeHandle`], and the same handle emits user actions that resolve
//! on the relay's acknowledgement.

pub mod api;
pub mod emitters;
pub mod error;
pub mod feed;
pub mod identity;
pub mod manager;
pub mod notifications;
pub mod realtime;

pub use api::{NotificationApi, RestClient};
pub use error::RealtimeError;
pub use feed::{FeedState, FeedSubscriber};
pub use identity::SessionIdentity;
pub use manager::ConnectionManager;
pub use notifications::{NotificationCenter, NotificationState, NotificationSubscriber};
pub use realtime::{ConnectionState, RealtimeClient, RealtimeConfig, RealtimeHandle, Subscription};
