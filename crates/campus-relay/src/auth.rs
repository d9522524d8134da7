use async_trait::async_trait;

use crate::error::RelayError;

/// The user a connection authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub display_name: String,
}

/// Checks the bearer token a client presents in its `hello` frame.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, RelayError>;
}

/// Accepts `Bearer <user_id>` (or a bare id) and trusts it as the user id.
///
/// Suitable where an upstream proxy has already verified the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerIdentityValidator;

#[async_trait]
impl TokenValidator for BearerIdentityValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, RelayError> {
        let token = token.trim();
        let user_id = match token {
            "Bearer" => "",
            _ => token.strip_prefix("Bearer ").unwrap_or(token).trim(),
        };
        if user_id.is_empty() {
            return Err(RelayError::Unauthorized("empty token".into()));
        }
        Ok(AuthenticatedUser {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
        })
    }
}
