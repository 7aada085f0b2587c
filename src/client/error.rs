//! Strategy service error types

use thiserror::Error;

use super::auth::TokenStoreError;

/// Failure of a call to the strategy service. Every variant is terminal for
/// the attempted operation; nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, timeout, DNS failure
    #[error("Failed to connect to the server.")]
    Transport(#[source] reqwest::Error),

    /// Non-success response; `message` was read from the body using the
    /// endpoint's own convention
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Token missing, or rejected with 401/403
    #[error("Session expired or missing, please log in again.")]
    Unauthorized { status: Option<u16> },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized { status } => *status,
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ApiError::Http {
            status: 400,
            message: "Strategy name already exists".to_string(),
        };
        assert_eq!(err.to_string(), "Strategy name already exists");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_unauthorized());

        let err = ApiError::Unauthorized { status: Some(403) };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "Session expired or missing, please log in again.");
    }
}
