//! Domain Errors
//!
//! Error types shared by the client, the session gate and the view models.

use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by catalog operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Local, pre-request rejection. No request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Nothing to select from")]
    EmptySelection,
}

/// Error body returned by the catalog service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The `error` field of a JSON server error body, if there is one
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Server { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .map(|b| b.error),
            _ => None,
        }
    }

    /// Short text suitable for an alert or toast
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Network(_) => "Could not reach the tea server. Please try again.".to_string(),
            Self::Server { status, .. } => self
                .server_message()
                .unwrap_or_else(|| format!("The server rejected the request ({status})")),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
            Self::Storage(_) => "Could not access local storage.".to_string(),
            Self::InvalidState(message) => message.clone(),
            Self::EmptySelection => "There are no teas to choose from.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_from_json_body() {
        let err = CatalogError::Server {
            status: 400,
            body: r#"{"error":"Incorrect password"}"#.to_string(),
        };
        assert_eq!(err.server_message().as_deref(), Some("Incorrect password"));
        assert_eq!(err.user_message(), "Incorrect password");
    }

    #[test]
    fn test_server_message_plain_body() {
        let err = CatalogError::Server {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert!(err.server_message().is_none());
        assert_eq!(err.user_message(), "The server rejected the request (502)");
    }

    #[test]
    fn test_is_validation() {
        assert!(CatalogError::validation("blank").is_validation());
        assert!(!CatalogError::Network("refused".into()).is_validation());
    }
}
