//! Session and registration reconciliation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            RegistrationDesk              │
//! │  open / edit / toggle / delete session   │
//! │  apply status action (no optimism)       │
//! │  eligible students                       │
//! └───────┬───────────────┬──────────────────┘
//!         │               │
//! ┌───────▼──────┐ ┌──────▼───────┐ ┌──────────────┐
//! │  validation  │ │    status    │ │ eligibility  │
//! │ keyed errors │ │ state machine│ │ set diff     │
//! └──────────────┘ └──────────────┘ └──────────────┘
//!         │
//! ┌───────▼─────────────────────────────────┐
//! │   RegistrationBackend (ApiClient)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The three inner modules are pure; only the desk talks to the backend.

pub mod backend;
pub mod desk;
pub mod eligibility;
pub mod status;
pub mod validation;

pub use backend::RegistrationBackend;
pub use desk::{audit_registrations, DeletionReport, OpenedSession, RegistrationDesk};
pub use eligibility::{eligible_for_session, eligible_students, previous_semester};
pub use status::{
    allowed_actions, expected_status, initial_status, next_status, plan_update, StatusAction,
    TransitionContext, TransitionError,
};
pub use validation::{session_payload, validate_session, FieldError, SessionField, ValidationErrors};
