use std::sync::Arc;

use attend_core::model::{Session, User};
use storage::repository::{SessionRepository, StorageError};
use tracing::{info, warn};

use crate::error::AuthError;

/// Mock sign-in: any email with any password is accepted and remembered.
#[derive(Clone)]
pub struct AuthService {
    sessions: Arc<dyn SessionRepository>,
}

impl AuthService {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Resume the remembered session, or a guest session when none is stored.
    ///
    /// A stored user that no longer parses is treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session store cannot be read.
    pub async fn restore(&self) -> Result<Session, AuthError> {
        match self.sessions.current_user().await {
            Ok(Some(user)) => Ok(Session::signed_in(user)),
            Ok(None) => Ok(Session::guest()),
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "discarding unreadable stored user");
                Ok(Session::guest())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Sign in as `email`. The password is not checked.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` for an invalid email.
    /// Returns `AuthError::Storage` if the user cannot be remembered.
    pub async fn login(&self, email: &str, _password: Option<&str>) -> Result<Session, AuthError> {
        let user = User::new(email)?;
        self.sessions.save_user(&user).await?;
        info!(email = user.email(), "signed in");
        Ok(Session::signed_in(user))
    }

    /// Forget the remembered user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session store cannot be cleared.
    pub async fn logout(&self) -> Result<Session, AuthError> {
        self.sessions.clear_user().await?;
        info!("signed out");
        Ok(Session::guest())
    }
}
