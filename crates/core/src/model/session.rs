use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a valid email address is required")]
    InvalidEmail,
}

/// A signed-in user of the mock login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    email: String,
}

impl User {
    /// Create a user from an email address.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidEmail` if the trimmed value is empty or has no `@`.
    pub fn new(email: impl Into<String>) -> Result<Self, SessionError> {
        let raw = email.into();
        let email = raw.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(SessionError::InvalidEmail);
        }
        Ok(Self {
            email: email.to_string(),
        })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Key that isolates this user's persisted subjects.
    #[must_use]
    pub fn key(&self) -> UserKey {
        UserKey(self.email.clone())
    }
}

/// Per-user storage partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserKey(String);

impl UserKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who is using the app right now; passed explicitly to every service call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    #[must_use]
    pub fn guest() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn user_key(&self) -> Option<UserKey> {
        self.user.as_ref().map(User::key)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
