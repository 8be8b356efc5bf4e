//! Unified error handling for the campusreg crate
//!
//! Domain errors ([`ApiError`], [`ValidationErrors`], [`TransitionError`])
//! are wrapped in a single [`Error`] so callers can classify any failure
//! with [`Error::category`] and turn it into a message with
//! [`Error::user_message`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use campusreg::error::{Error, ErrorCategory};
//!
//! fn report(err: &Error) {
//!     match err.category() {
//!         ErrorCategory::Validation => show_inline(err),
//!         ErrorCategory::Authorization => redirect_to_login(),
//!         _ => show_banner(&err.user_message()),
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::api::error::ApiError;
pub use crate::reconciler::status::TransitionError;
pub use crate::reconciler::validation::ValidationErrors;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Local form validation, never sent to the backend
    Validation,
    /// Network unreachable or timeout
    Transport,
    /// Login session ended or missing
    Authorization,
    /// Backend refused the request
    BusinessRule,
    /// Backend response could not be used
    InvalidResponse,
    /// Local state machine refusal
    Transition,
    /// Configuration errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Validation error",
            Self::Transport => "Connection problem",
            Self::Authorization => "Session expired",
            Self::BusinessRule => "Request rejected",
            Self::InvalidResponse => "Unexpected server response",
            Self::Transition => "Action not available",
            Self::Config => "Configuration error",
            Self::Other => "Error",
        }
    }
}

/// Unified error type for the campusreg crate
#[derive(Error, Debug)]
pub enum Error {
    /// Backend API errors
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Session draft validation errors
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Status transition refused locally
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Notice template registration or rendering errors
    #[error("Template error: {0}")]
    Template(String),
}

impl Error {
    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api(e) => match e {
                ApiError::Network(_) | ApiError::Timeout => ErrorCategory::Transport,
                ApiError::SessionExpired(_) | ApiError::NotAuthenticated => {
                    ErrorCategory::Authorization
                }
                ApiError::Rejected { .. } => ErrorCategory::BusinessRule,
                ApiError::InvalidResponse(_) => ErrorCategory::InvalidResponse,
                ApiError::Init(_) | ApiError::InvalidUrl(_) => ErrorCategory::Config,
            },
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Transition(_) => ErrorCategory::Transition,
            Self::Template(_) => ErrorCategory::Other,
        }
    }

    /// Whether the user can simply retry the same action
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_transport(),
            Self::Transition(TransitionError::InFlight(_)) => true,
            _ => false,
        }
    }

    /// Message to show the user
    ///
    /// Backend rejections are passed through untouched.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Rejected { message, .. }) => message.clone(),
            Self::Api(e) if e.is_transport() => {
                format!("{}: {e}. Please try again.", self.category().description())
            }
            Self::Api(ApiError::SessionExpired(_)) | Self::Api(ApiError::NotAuthenticated) => {
                "Your session has expired. Please log in again.".to_string()
            }
            _ => format!("{}: {self}", self.category().description()),
        }
    }
}

impl From<handlebars::RenderError> for Error {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
