//! Account View Model
//!
//! Login, password change and logout.

use std::sync::Arc;
use tracing::{info, warn};

use super::session::SessionStore;
use super::state::Notice;
use crate::domain::{CatalogError, Session};
use crate::ports::{CatalogApi, TokenStorage};

pub struct AccountViewModel<A: CatalogApi + 'static, S: TokenStorage> {
    api: Arc<A>,
    sessions: SessionStore<S>,
    notice: Option<Notice>,
}

impl<A: CatalogApi + 'static, S: TokenStorage> AccountViewModel<A, S> {
    pub fn new(api: Arc<A>, sessions: SessionStore<S>) -> Self {
        Self {
            api,
            sessions,
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn reject(&mut self, title: &str, e: CatalogError) -> CatalogError {
        self.notice = Some(Notice::error(title, e.user_message()));
        e
    }

    /// Log in and remember the session on this device
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, CatalogError> {
        const TITLE: &str = "Error logging in";

        if username.is_empty() {
            return Err(self.reject(TITLE, CatalogError::validation("Please enter a username")));
        }
        if password.is_empty() {
            return Err(self.reject(TITLE, CatalogError::validation("Please enter a password")));
        }

        let session = match self.api.login(username, password).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Login failed");
                let message = match e.server_message().as_deref() {
                    Some("Incorrect password") => "Incorrect password".to_string(),
                    Some("User doesn't exist") => "Incorrect username".to_string(),
                    _ => "Please try again.".to_string(),
                };
                self.notice = Some(Notice::error(TITLE, message));
                return Err(e);
            }
        };

        if let Err(e) = self.sessions.set(&session).await {
            return Err(self.reject(TITLE, e));
        }

        info!("Logged in");
        self.notice = Some(Notice::info("Successfully logged in!"));
        Ok(session)
    }

    /// Change the password of the logged-in user. `api` must carry the session.
    pub async fn change_password(
        &mut self,
        old: &str,
        new: &str,
        repeat: &str,
    ) -> Result<(), CatalogError> {
        const TITLE: &str = "Error changing password";

        let invalid = if old.is_empty() {
            Some("Please enter your old password")
        } else if new.is_empty() {
            Some("Please enter your new password")
        } else if repeat.is_empty() {
            Some("Please repeat your new password")
        } else if new != repeat {
            Some("New passwords do not match")
        } else if old == new {
            Some("Your new password cannot be your old password")
        } else {
            None
        };
        if let Some(message) = invalid {
            return Err(self.reject(TITLE, CatalogError::validation(message)));
        }

        if let Err(e) = self.api.change_password(old, new).await {
            warn!(error = %e, "Password change failed");
            let message = match e.server_message().as_deref() {
                Some("Incorrect password") => "Your old password is incorrect".to_string(),
                _ => "Please try again.".to_string(),
            };
            self.notice = Some(Notice::error(TITLE, message));
            return Err(e);
        }

        info!("Password changed");
        self.notice = Some(Notice::info("Successfully changed password!"));
        Ok(())
    }

    /// Forget the stored session
    pub async fn logout(&mut self) -> Result<(), CatalogError> {
        if let Err(e) = self.sessions.clear().await {
            return Err(self.reject("Error logging out", e));
        }
        self.notice = Some(Notice::info("Successfully logged out!"));
        Ok(())
    }
}
