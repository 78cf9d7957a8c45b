//! Session - proof of a prior successful login

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session token issued by `POST /login`.
///
/// The client cannot check the token's signature or expiry; only the server
/// can say whether it is still accepted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_token() {
        let session = Session::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("redacted"));
    }
}
