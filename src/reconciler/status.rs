//! Registration status state machine
//!
//! ```text
//!   pending ──submit──▶ library_pending ──clear library──▶ payment_pending ──fee paid──▶ completed
//!      │                      │                                 ▲     │                    ▲
//!      └──submit (no clearance needed)──────────────────────────┘     │                    │
//!      └──────────────── approve & complete (any non-terminal) ───────┴────────────────────┘
//! ```
//!
//! `completed` is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::models::{FeeStatus, Registration, RegistrationStatus, StatusUpdate};

/// Action an admin (or a student submission) can apply to a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    /// Student submits the registration
    Submit,
    /// Library record cleared
    ClearLibrary,
    /// Fee marked as paid
    MarkFeePaid,
    /// Admin override straight to completed
    ApproveAndComplete,
}

impl StatusAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::ClearLibrary => "clear_library",
            Self::MarkFeePaid => "mark_fee_paid",
            Self::ApproveAndComplete => "approve_and_complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "submit" => Some(Self::Submit),
            "clear_library" => Some(Self::ClearLibrary),
            "mark_fee_paid" | "fee_paid" => Some(Self::MarkFeePaid),
            "approve_and_complete" | "approve" => Some(Self::ApproveAndComplete),
            _ => None,
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts about the registration's session needed to route a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionContext {
    /// The session requires library clearance
    pub library_required: bool,
    /// The student's library record is already clear
    pub library_cleared: bool,
}

impl TransitionContext {
    pub fn new(library_required: bool, library_cleared: bool) -> Self {
        Self {
            library_required,
            library_cleared,
        }
    }

    fn clearance_outstanding(&self) -> bool {
        self.library_required && !self.library_cleared
    }
}

/// Errors from applying a status action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Nothing leaves `completed`
    #[error("Registration is already completed; '{action}' is not available")]
    Terminal { action: StatusAction },

    /// Action not legal in the current state
    #[error("'{action}' is not available while the registration is {from}")]
    NotAllowed {
        from: RegistrationStatus,
        action: StatusAction,
    },

    /// Another action for this registration has not resolved yet
    #[error("An action for registration {0} is still in progress")]
    InFlight(String),

    /// Registration is not in the current view
    #[error("Registration {0} not found")]
    UnknownRegistration(String),
}

/// Status a fresh submission starts in
pub fn initial_status(ctx: TransitionContext) -> RegistrationStatus {
    if ctx.clearance_outstanding() {
        RegistrationStatus::LibraryPending
    } else {
        RegistrationStatus::PaymentPending
    }
}

/// Actions a front end should enable for a registration in `status`
pub fn allowed_actions(status: RegistrationStatus) -> &'static [StatusAction] {
    match status {
        RegistrationStatus::Pending => &[StatusAction::Submit, StatusAction::ApproveAndComplete],
        RegistrationStatus::LibraryPending => {
            &[StatusAction::ClearLibrary, StatusAction::ApproveAndComplete]
        }
        RegistrationStatus::PaymentPending => {
            &[StatusAction::MarkFeePaid, StatusAction::ApproveAndComplete]
        }
        RegistrationStatus::Completed => &[],
    }
}

pub fn is_terminal(status: RegistrationStatus) -> bool {
    status == RegistrationStatus::Completed
}

/// Apply `action` to `from`, returning the resulting status
pub fn next_status(
    from: RegistrationStatus,
    action: StatusAction,
    ctx: TransitionContext,
) -> Result<RegistrationStatus, TransitionError> {
    use RegistrationStatus::*;

    match (from, action) {
        (Completed, _) => Err(TransitionError::Terminal { action }),
        (Pending, StatusAction::Submit) => Ok(initial_status(ctx)),
        (LibraryPending, StatusAction::ClearLibrary) => Ok(PaymentPending),
        (PaymentPending, StatusAction::MarkFeePaid) => Ok(Completed),
        (_, StatusAction::ApproveAndComplete) => Ok(Completed),
        (from, action) => Err(TransitionError::NotAllowed { from, action }),
    }
}

/// Resolve an action into the request body sent to the backend
pub fn plan_update(
    from: RegistrationStatus,
    action: StatusAction,
    ctx: TransitionContext,
) -> Result<StatusUpdate, TransitionError> {
    let status = next_status(from, action, ctx)?;
    let (fee_status, library_cleared) = match action {
        StatusAction::MarkFeePaid => (Some(FeeStatus::Paid), None),
        StatusAction::ClearLibrary => (None, Some(true)),
        StatusAction::Submit | StatusAction::ApproveAndComplete => (None, None),
    };

    Ok(StatusUpdate {
        status,
        fee_status,
        library_cleared,
    })
}

/// Status the stored fields of a registration imply
///
/// `pending` and `completed` are taken as stored; the intermediate states
/// follow the library flag.
pub fn expected_status(registration: &Registration, library_required: bool) -> RegistrationStatus {
    match registration.status {
        RegistrationStatus::Pending | RegistrationStatus::Completed => registration.status,
        RegistrationStatus::LibraryPending | RegistrationStatus::PaymentPending => {
            initial_status(TransitionContext::new(
                library_required,
                registration.library_cleared,
            ))
        }
    }
}
