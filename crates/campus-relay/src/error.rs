/// Failures the relay reports back to a client.
///
/// Display strings are sent verbatim as the `error` field of an ack, so they
/// are written for the end user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Content required")]
    ContentRequired,

    #[error("Department required")]
    DepartmentRequired,

    #[error("Post not found")]
    PostNotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error")]
    Internal(String),
}
