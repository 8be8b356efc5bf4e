//! Gateway to the portal's REST backend
//!
//! All backend traffic goes through a single [`ApiClient`]. The client reads
//! its bearer token from an explicitly injected [`SessionContext`] and ends
//! that session only when the backend reports the token itself as invalid.
//!
//! # Usage
//!
//! ```no_run
//! use campusreg::api::{ApiClient, ClientConfig, SessionContext};
//!
//! # async fn run() -> Result<(), campusreg::api::ApiError> {
//! let session = SessionContext::new();
//! let client = ApiClient::new(ClientConfig::new("http://localhost:5000/api"), session)?;
//! client.login("admin@college.edu", "secret").await?;
//! let sessions = client.list_sessions().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{AuthSession, PortalUser, SessionContext};
pub use client::{ApiClient, ClientConfig, RegistrationFilter};
pub use error::ApiError;
