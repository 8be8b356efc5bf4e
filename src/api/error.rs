//! Error types for the portal API client

use thiserror::Error;

/// Backend messages that mean the bearer token itself is no longer valid
const INVALID_TOKEN_MARKERS: &[&str] = &[
    "invalid token",
    "token expired",
    "jwt expired",
    "invalid_token",
    "token is not valid",
];

/// Check whether a 401 body signals an invalid or expired session token
///
/// Other 401s (a resource not visible to this role) do not match.
pub fn is_invalid_token_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    INVALID_TOKEN_MARKERS.iter().any(|m| lower.contains(m))
}

/// Errors that can occur while talking to the portal backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Client could not be built
    #[error("Client initialization failed: {0}")]
    Init(String),

    /// Network unreachable, connection reset, DNS failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// The session token is invalid or expired; the session was ended
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// No session token is available for an authenticated call
    #[error("Not logged in")]
    NotAuthenticated,

    /// Backend refused the request; message is shown as-is
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Backend answered 2xx with a body we could not use
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Transport failures can be retried by the user
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }

    /// Whether the error ended the login session
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    /// HTTP status of a backend rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            Self::Init(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_token_detection() {
        assert!(is_invalid_token_message("Invalid token"));
        assert!(is_invalid_token_message("jwt expired"));
        assert!(is_invalid_token_message("Token expired, please login again"));
        assert!(!is_invalid_token_message("Not authorized to view this resource"));
        assert!(!is_invalid_token_message(""));
    }

    #[test]
    fn test_rejection_message_is_verbatim() {
        let err = ApiError::Rejected {
            status: 400,
            message: "Cannot complete registration with unpaid fees".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot complete registration with unpaid fees");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_classification() {
        assert!(ApiError::Timeout.is_transport());
        assert!(ApiError::Network("refused".to_string()).is_transport());
        assert!(ApiError::SessionExpired("Invalid token".to_string()).ends_session());
    }
}
