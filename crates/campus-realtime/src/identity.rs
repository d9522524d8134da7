use campus_common::UserProfile;
use serde::{Deserialize, Serialize};

/// The signed-in user, as seen by the realtime layer.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub department: Option<String>,
    /// Explicit bearer token from the auth provider. When absent the user id
    /// itself is presented.
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIdentity")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("department", &self.department)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl SessionIdentity {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            department: None,
            access_token: None,
        }
    }

    /// Hydrate an identity from `GET /api/users/{userId}`.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            user_id: profile.id.clone(),
            display_name: profile.name.clone(),
            department: profile.department.clone(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Bearer-style string presented in the relay handshake.
    pub fn bearer_token(&self) -> String {
        let secret = self.access_token.as_deref().unwrap_or(&self.user_id);
        format!("Bearer {secret}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_falls_back_to_user_id() {
        let identity = SessionIdentity::new("u1", "Ada");
        assert_eq!(identity.bearer_token(), "Bearer u1");
    }

    #[test]
    fn bearer_prefers_access_token() {
        let identity = SessionIdentity::new("u1", "Ada").with_access_token("jwt-abc");
        assert_eq!(identity.bearer_token(), "Bearer jwt-abc");
    }

    #[test]
    fn debug_redacts_token() {
        let identity = SessionIdentity::new("u1", "Ada").with_access_token("jwt-abc");
        let debug = format!("{identity:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("jwt-abc"));
    }

    #[test]
    fn from_profile_copies_department() {
        let profile = UserProfile {
            id: "u7".into(),
            name: "Grace".into(),
            email: "grace@campus.example.edu".into(),
            department: Some("Physics".into()),
            avatar: None,
        };
        let identity = SessionIdentity::from_profile(&profile);
        assert_eq!(identity.user_id, "u7");
        assert_eq!(identity.display_name, "Grace");
        assert_eq!(identity.department.as_deref(), Some("Physics"));
    }
}
