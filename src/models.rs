// Core data structures shared by the API client and the reconciler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Lowest and highest semester a session can be opened for
pub const MIN_SEMESTER: u8 = 1;
pub const MAX_SEMESTER: u8 = 8;

// ============================================================================
// Registration Session
// ============================================================================

/// An admin-opened window during which students register for a semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSession {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub session_id: String,
    pub semester: u8,
    pub academic_year: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub fee_deadline: DateTime<Utc>,
    pub fee_amount: u64,
    #[serde(default)]
    pub available_courses: Vec<String>,
    #[serde(default)]
    pub library_requirement: bool,
    #[serde(default)]
    pub is_active: bool,
}

impl RegistrationSession {
    /// Whether students can submit against this session at `now`
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }

    /// Whether the fee deadline has passed at `now`
    pub fn fee_overdue_at(&self, now: DateTime<Utc>) -> bool {
        now > self.fee_deadline
    }

    /// Check if a course is offered in this session
    pub fn offers(&self, course: &str) -> bool {
        self.available_courses.iter().any(|c| c == course)
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Status of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    LibraryPending,
    PaymentPending,
    Completed,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::LibraryPending => "library_pending",
            Self::PaymentPending => "payment_pending",
            Self::Completed => "completed",
        }
    }

    /// Parse from the backend's string form
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "library_pending" => Some(Self::LibraryPending),
            "payment_pending" => Some(Self::PaymentPending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::LibraryPending => "Library clearance pending",
            Self::PaymentPending => "Payment pending",
            Self::Completed => "Completed",
        }
    }
}

impl Default for RegistrationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fee payment status of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl Default for FeeStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Partial => write!(f, "partial"),
            Self::Paid => write!(f, "paid"),
            Self::Overdue => write!(f, "overdue"),
        }
    }
}

/// One student's application against a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub registration_id: String,
    pub session_id: String,
    pub university_reg_number: String,
    pub student_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub current_semester: u8,
    pub registering_for_semester: u8,
    #[serde(default)]
    pub selected_courses: Vec<String>,
    #[serde(default)]
    pub status: RegistrationStatus,
    #[serde(default)]
    pub fee_status: FeeStatus,
    #[serde(default)]
    pub library_cleared: bool,
    pub registered_at: DateTime<Utc>,
}

/// Inconsistency between a registration and its owning session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationIssue {
    /// Registering semester is not current semester + 1
    SemesterMismatch { current: u8, registering: u8 },
    /// No courses were selected
    NoCoursesSelected,
    /// A selected course is not offered by the session
    CourseNotOffered(String),
    /// Registration belongs to another session
    ForeignSession(String),
}

impl fmt::Display for RegistrationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SemesterMismatch {
                current,
                registering,
            } => write!(
                f,
                "registering for semester {registering} from semester {current}"
            ),
            Self::NoCoursesSelected => write!(f, "no courses selected"),
            Self::CourseNotOffered(course) => write!(f, "course '{course}' is not offered"),
            Self::ForeignSession(id) => write!(f, "registration belongs to session {id}"),
        }
    }
}

impl Registration {
    /// Registration number used as the identity key within a session
    pub fn reg_number_key(&self) -> &str {
        self.university_reg_number.trim()
    }

    /// Report violations of the registration invariants against `session`
    pub fn check_against(&self, session: &RegistrationSession) -> Vec<RegistrationIssue> {
        let mut issues = Vec::new();

        if self.session_id != session.session_id {
            issues.push(RegistrationIssue::ForeignSession(self.session_id.clone()));
        }

        if u16::from(self.registering_for_semester) != u16::from(self.current_semester) + 1 {
            issues.push(RegistrationIssue::SemesterMismatch {
                current: self.current_semester,
                registering: self.registering_for_semester,
            });
        }

        if self.selected_courses.is_empty() {
            issues.push(RegistrationIssue::NoCoursesSelected);
        }

        for course in &self.selected_courses {
            if !session.offers(course) {
                issues.push(RegistrationIssue::CourseNotOffered(course.clone()));
            }
        }

        issues
    }
}

/// Body of a registration status change request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_status: Option<FeeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_cleared: Option<bool>,
}

// ============================================================================
// Roster
// ============================================================================

/// Roster row as the backend sends it
///
/// Older records carry the semester under `course.semester` instead of
/// `currentSemester`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRosterStudent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    university_reg_number: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    current_semester: Option<u8>,
    #[serde(default)]
    course: Option<RawCourse>,
}

#[derive(Debug, Deserialize)]
struct RawCourse {
    #[serde(default)]
    semester: Option<u8>,
}

/// A currently enrolled student, normalized at ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRosterStudent", rename_all = "camelCase")]
pub struct RosterStudent {
    pub name: String,
    pub university_reg_number: String,
    pub email: String,
    pub current_semester: Option<u8>,
}

impl From<RawRosterStudent> for RosterStudent {
    fn from(raw: RawRosterStudent) -> Self {
        let course_semester = raw.course.and_then(|c| c.semester);
        if let (Some(current), Some(course)) = (raw.current_semester, course_semester) {
            if current != course {
                tracing::debug!(
                    reg_number = %raw.university_reg_number,
                    current_semester = current,
                    course_semester = course,
                    "Roster semester fields disagree, using currentSemester"
                );
            }
        }

        Self {
            name: raw.name,
            university_reg_number: raw.university_reg_number,
            email: raw.email,
            current_semester: raw.current_semester.or(course_semester),
        }
    }
}

/// A roster student entitled to register who has not done so yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleStudent {
    pub name: String,
    pub university_reg_number: String,
    pub email: String,
    pub current_semester: u8,
}

// ============================================================================
// Session Draft
// ============================================================================

/// A branch chosen in the session form, with its subject list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSelection {
    pub branch: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// Notice to publish alongside a new session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Admin input for opening or editing a registration session
///
/// Numbers are kept signed so out-of-range input reaches validation as a
/// keyed error instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub semester: i64,
    pub academic_year: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub fee_deadline: DateTime<Utc>,
    pub fee_amount: i64,
    #[serde(default)]
    pub library_requirement: Option<bool>,
    #[serde(default)]
    pub branches: Vec<BranchSelection>,
    #[serde(default)]
    pub notice: Option<NoticeDraft>,
}

impl SessionDraft {
    /// Flatten the selected branches' subjects, first occurrence wins
    pub fn available_courses(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.branches
            .iter()
            .flat_map(|b| b.subjects.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.to_string()))
            .map(str::to_string)
            .collect()
    }
}

/// Session fields minus identity, as accepted by create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub semester: u8,
    pub academic_year: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub fee_deadline: DateTime<Utc>,
    pub fee_amount: u64,
    pub available_courses: Vec<String>,
    pub library_requirement: bool,
}

// ============================================================================
// Notice
// ============================================================================

/// Notice creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeRequest {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: String,
    pub target_audience: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub links: Vec<NoticeLink>,
    pub signed_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeLink {
    pub title: String,
    pub url: String,
}

/// Notice as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
}
