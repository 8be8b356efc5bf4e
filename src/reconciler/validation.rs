//! Session draft validation
//!
//! Every rule is checked on every call and each violated rule yields one
//! keyed error. Rules never look at each other's outcome.

use std::fmt;

use thiserror::Error;

use crate::config::PortalConfig;
use crate::models::{SessionDraft, SessionPayload, MAX_SEMESTER, MIN_SEMESTER};

/// Field a validation error is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionField {
    Semester,
    AcademicYear,
    EndDate,
    FeeDeadline,
    FeeAmount,
    AvailableCourses,
    NoticeTitle,
    NoticeContent,
}

impl SessionField {
    /// Form key of the field
    pub fn key(&self) -> &'static str {
        match self {
            Self::Semester => "semester",
            Self::AcademicYear => "academicYear",
            Self::EndDate => "endDate",
            Self::FeeDeadline => "feeDeadline",
            Self::FeeAmount => "feeAmount",
            Self::AvailableCourses => "availableCourses",
            Self::NoticeTitle => "noticeTitle",
            Self::NoticeContent => "noticeContent",
        }
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: SessionField,
    pub message: String,
}

/// All violated rules of a draft
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("Invalid session: {}", join_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    fn push(&mut self, field: SessionField, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for a field, if that field failed
    pub fn get(&self, field: SessionField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn fields(&self) -> Vec<SessionField> {
        self.errors.iter().map(|e| e.field).collect()
    }
}

/// Check a draft, reporting every violated rule
pub fn validate_session(draft: &SessionDraft) -> Result<(), ValidationErrors> {
    check_session(draft).map(|_| ())
}

/// Validate a draft and build the body the backend accepts
///
/// An unset library requirement takes the configured default for the
/// semester.
pub fn session_payload(
    draft: &SessionDraft,
    portal: &PortalConfig,
) -> Result<SessionPayload, ValidationErrors> {
    let (semester, fee_amount) = check_session(draft)?;

    Ok(SessionPayload {
        semester,
        academic_year: draft.academic_year.trim().to_string(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        fee_deadline: draft.fee_deadline,
        fee_amount,
        available_courses: draft.available_courses(),
        library_requirement: draft
            .library_requirement
            .unwrap_or_else(|| portal.library_required_for(semester)),
    })
}

/// Run every rule; on success return the range-checked semester and fee
fn check_session(draft: &SessionDraft) -> Result<(u8, u64), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let semester = u8::try_from(draft.semester)
        .ok()
        .filter(|s| (MIN_SEMESTER..=MAX_SEMESTER).contains(s));
    if semester.is_none() {
        errors.push(
            SessionField::Semester,
            format!("Semester must be between {MIN_SEMESTER} and {MAX_SEMESTER}"),
        );
    }

    if draft.academic_year.trim().is_empty() {
        errors.push(SessionField::AcademicYear, "Academic year is required");
    }

    if draft.end_date <= draft.start_date {
        errors.push(SessionField::EndDate, "End date must be after start date");
    }

    if draft.fee_deadline <= draft.end_date {
        errors.push(
            SessionField::FeeDeadline,
            "Fee deadline must be after end date",
        );
    }

    let fee_amount = u64::try_from(draft.fee_amount).ok().filter(|f| *f > 0);
    if fee_amount.is_none() {
        errors.push(SessionField::FeeAmount, "Fee amount must be greater than 0");
    }

    if draft.available_courses().is_empty() {
        errors.push(
            SessionField::AvailableCourses,
            "Select at least one branch with subjects",
        );
    }

    if let Some(notice) = &draft.notice {
        if notice.title.trim().is_empty() {
            errors.push(SessionField::NoticeTitle, "Notice title is required");
        }
        if notice.content.trim().is_empty() {
            errors.push(SessionField::NoticeContent, "Notice content is required");
        }
    }

    match (semester, fee_amount) {
        (Some(semester), Some(fee_amount)) if errors.is_empty() => Ok((semester, fee_amount)),
        _ => Err(errors),
    }
}
