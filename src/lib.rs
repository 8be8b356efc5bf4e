//! campusreg - registration session reconciler for a college admin portal
//!
//! A client for the portal's REST backend together with the logic the
//! portal's admin pages need: which students may still register for a
//! session, what a registration's status allows next, and whether a
//! session definition is acceptable before it is sent.
//!
//! # Architecture
//!
//! - [`api`] - HTTP client, bearer token handling and error classification
//! - [`reconciler`] - Eligibility, status state machine, validation, desk
//! - [`models`] - Sessions, registrations, roster rows, drafts
//! - [`notice`] - Notices published alongside a new session
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use campusreg::api::{ApiClient, SessionContext};
//! use campusreg::config::Config;
//! use campusreg::reconciler::RegistrationDesk;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = ApiClient::new(config.client_config(), SessionContext::new())?;
//!     client.login("admin@college.edu", "secret").await?;
//!
//!     let desk = RegistrationDesk::new(Arc::new(client), &config)?;
//!     for session in desk.sessions().await? {
//!         let eligible = desk.eligible_students(&session).await?;
//!         println!("{}: {} still to register", session.session_id, eligible.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notice;
pub mod reconciler;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ApiClient, ApiError, ClientConfig, RegistrationFilter, SessionContext};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{
        EligibleStudent, FeeStatus, Registration, RegistrationSession, RegistrationStatus,
        RosterStudent, SessionDraft,
    };
    pub use crate::reconciler::{RegistrationDesk, StatusAction};
}

// Direct re-exports for convenience
pub use models::{Registration, RegistrationSession, RegistrationStatus};
