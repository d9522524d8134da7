use campus_common::{FeedUpdate, Post};
use tracing::debug;

/// Posts as the client currently believes them to be, newest first.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    posts: Vec<Post>,
}

impl FeedState {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Replace the held list, e.g. after an initial REST load.
    pub fn replace(&mut self, posts: Vec<Post>) {
        self.posts = posts;
    }

    /// Apply one pushed update in arrival order.
    ///
    /// Returns `false` when the update names a post this client does not
    /// hold; such updates are dropped.
    pub fn apply(&mut self, update: FeedUpdate) -> bool {
        match update {
            FeedUpdate::NewPost { post } => {
                self.posts.insert(0, post);
                true
            }
            FeedUpdate::NewComment { post_id, comment } => match self.find_mut(&post_id) {
                Some(post) => {
                    post.comments.push(comment);
                    true
                }
                None => {
                    debug!(post_id = %post_id, "Comment for unknown post dropped");
                    false
                }
            },
            FeedUpdate::NewLike { post_id } => match self.find_mut(&post_id) {
                Some(post) => {
                    post.likes = post.likes.saturating_add(1);
                    true
                }
                None => {
                    debug!(post_id = %post_id, "Like for unknown post dropped");
                    false
                }
            },
        }
    }

    fn find_mut(&mut self, post_id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == post_id)
    }
}
