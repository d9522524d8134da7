//! Notification list, unread counter, and the push listener feeding them.

mod center;
mod state;
mod subscriber;

pub use center::NotificationCenter;
pub use state::NotificationState;
pub use subscriber::NotificationSubscriber;
