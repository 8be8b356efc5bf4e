//! Common test utilities

use chrono::{DateTime, TimeZone, Utc};
use campusreg::models::{
    BranchSelection, FeeStatus, Registration, RegistrationSession, RegistrationStatus,
    RosterStudent, SessionDraft,
};

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Semester 5 session with ten courses and library clearance
#[allow(dead_code)]
pub fn create_test_session() -> RegistrationSession {
    RegistrationSession {
        id: "665f1c2a9b1e8a0012ab34cd".to_string(),
        session_id: "SES-2024-S5".to_string(),
        semester: 5,
        academic_year: "2024-25".to_string(),
        start_date: date(2024, 8, 1),
        end_date: date(2024, 8, 31),
        fee_deadline: date(2024, 9, 15),
        fee_amount: 45000,
        available_courses: (1..=10).map(|i| format!("CS50{i}")).collect(),
        library_requirement: true,
        is_active: true,
    }
}

/// Draft matching [`create_test_session`]
#[allow(dead_code)]
pub fn create_test_draft() -> SessionDraft {
    SessionDraft {
        semester: 5,
        academic_year: "2024-25".to_string(),
        start_date: date(2024, 8, 1),
        end_date: date(2024, 8, 31),
        fee_deadline: date(2024, 9, 15),
        fee_amount: 45000,
        library_requirement: Some(true),
        branches: vec![BranchSelection {
            branch: "CSE".to_string(),
            subjects: (1..=10).map(|i| format!("CS50{i}")).collect(),
        }],
        notice: None,
    }
}

#[allow(dead_code)]
pub fn create_student(name: &str, reg: &str, semester: Option<u8>) -> RosterStudent {
    RosterStudent {
        name: name.to_string(),
        university_reg_number: reg.to_string(),
        email: format!("{}@college.edu", name.to_lowercase()),
        current_semester: semester,
    }
}

#[allow(dead_code)]
pub fn create_registration(
    id: &str,
    session_id: &str,
    reg: &str,
    status: RegistrationStatus,
) -> Registration {
    Registration {
        id: id.to_string(),
        registration_id: format!("REG-{id}"),
        session_id: session_id.to_string(),
        university_reg_number: reg.to_string(),
        student_name: format!("Student {reg}"),
        email: format!("{}@college.edu", reg.to_lowercase()),
        phone: "9800000000".to_string(),
        current_semester: 4,
        registering_for_semester: 5,
        selected_courses: vec!["CS501".to_string(), "CS502".to_string()],
        status,
        fee_status: FeeStatus::Pending,
        library_cleared: false,
        registered_at: date(2024, 8, 5),
    }
}
