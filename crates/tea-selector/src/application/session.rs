//! Session Store
//!
//! Persists the login token on the device and checks it with the server.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{CatalogError, Session};
use crate::ports::{CatalogApi, TokenStorage};

/// Storage key the token lives under
pub const SESSION_KEY: &str = "jwt_token";

/// The device's single login session
pub struct SessionStore<S: TokenStorage> {
    storage: Arc<S>,
}

impl<S: TokenStorage> Clone for SessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: TokenStorage> SessionStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// The stored session, if any. Storage failures read as "no session".
    pub async fn get(&self) -> Option<Session> {
        match self.storage.get_item(SESSION_KEY).await {
            Ok(Some(token)) if !token.is_empty() => Some(Session::new(token)),
            Ok(_) => {
                debug!("No stored session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                None
            }
        }
    }

    /// Store `session`, replacing any previous one
    pub async fn set(&self, session: &Session) -> Result<(), CatalogError> {
        self.storage.set_item(SESSION_KEY, session.token()).await?;
        info!("Session stored");
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), CatalogError> {
        self.storage.remove_item(SESSION_KEY).await?;
        info!("Session cleared");
        Ok(())
    }

    /// Whether the server still accepts `session`.
    ///
    /// Fails closed: any error, including an unreachable server, is `false`.
    pub async fn validate<A: CatalogApi + ?Sized>(&self, api: &A, session: &Session) -> bool {
        match api.verify_session(session).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Stored session not accepted");
                false
            }
        }
    }

    /// Stored session, but only if the server accepts it
    pub async fn restore<A: CatalogApi + ?Sized>(&self, api: &A) -> Option<Session> {
        let session = self.get().await?;
        if self.validate(api, &session).await {
            Some(session)
        } else {
            None
        }
    }
}
