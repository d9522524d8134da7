//! Feed held by the client and kept current from `feed-update` pushes.

mod state;
mod subscriber;

pub use state::FeedState;
pub use subscriber::FeedSubscriber;
