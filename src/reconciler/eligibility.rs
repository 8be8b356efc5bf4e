//! Eligible-but-unregistered student computation

use std::collections::HashSet;

use crate::models::{
    EligibleStudent, Registration, RegistrationSession, RosterStudent, MIN_SEMESTER,
};

/// Semester a student must currently be in to register for `semester`
pub fn previous_semester(semester: u8) -> u8 {
    semester.saturating_sub(1).max(MIN_SEMESTER)
}

/// Students entitled to register for `semester` who have not registered yet
///
/// `registrations` must already be limited to one session. Output keeps
/// roster order. Students without a known semester are never eligible.
pub fn eligible_students(
    semester: u8,
    registrations: &[Registration],
    roster: &[RosterStudent],
) -> Vec<EligibleStudent> {
    let registered: HashSet<&str> = registrations.iter().map(|r| r.reg_number_key()).collect();
    let wanted = previous_semester(semester);

    roster
        .iter()
        .filter_map(|student| {
            let current = student.current_semester?;
            if current != wanted {
                return None;
            }
            let key = student.university_reg_number.trim();
            if registered.contains(key) {
                return None;
            }
            Some(EligibleStudent {
                name: student.name.clone(),
                university_reg_number: key.to_string(),
                email: student.email.clone(),
                current_semester: current,
            })
        })
        .collect()
}

/// Same as [`eligible_students`], skipping registrations of other sessions
pub fn eligible_for_session(
    session: &RegistrationSession,
    registrations: &[Registration],
    roster: &[RosterStudent],
) -> Vec<EligibleStudent> {
    let own: Vec<Registration> = registrations
        .iter()
        .filter(|r| r.session_id == session.session_id)
        .cloned()
        .collect();

    let eligible = eligible_students(session.semester, &own, roster);
    tracing::debug!(
        session_id = %session.session_id,
        semester = session.semester,
        registered = own.len(),
        roster = roster.len(),
        eligible = eligible.len(),
        "Computed eligible students"
    );
    eligible
}
