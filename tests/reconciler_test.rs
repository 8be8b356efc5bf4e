//! Eligibility, state machine and validation properties

mod common;

use std::collections::HashSet;

use campusreg::models::{RegistrationStatus, RosterStudent, SessionDraft};
use campusreg::reconciler::{
    eligible_students, next_status, previous_semester, validate_session, SessionField,
    StatusAction, TransitionContext,
};
use proptest::prelude::*;

use common::{create_registration, create_student, create_test_draft, date};

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_semester_five_session_is_valid() {
    assert!(validate_session(&create_test_draft()).is_ok());
}

#[test]
fn test_fee_deadline_before_end_date_single_error() {
    let draft = SessionDraft {
        fee_deadline: date(2024, 8, 20),
        ..create_test_draft()
    };
    let errors = validate_session(&draft).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors.get(SessionField::FeeDeadline).is_some());
}

#[test]
fn test_two_semester_four_students_eligible() {
    let roster = vec![
        create_student("Asha", "U1", Some(4)),
        create_student("Bala", "U2", Some(4)),
        create_student("Chen", "U3", Some(5)),
    ];
    let eligible = eligible_students(5, &[], &roster);
    let names: Vec<_> = eligible.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Asha", "Bala"]);
}

#[test]
fn test_registered_student_drops_out() {
    let roster = vec![
        create_student("Asha", "U1", Some(4)),
        create_student("Bala", "U2", Some(4)),
        create_student("Chen", "U3", Some(5)),
    ];
    let registrations = vec![create_registration(
        "r1",
        "SES-2024-S5",
        "U2",
        RegistrationStatus::Pending,
    )];
    let eligible = eligible_students(5, &registrations, &roster);
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].name, "Asha");
}

#[test]
fn test_pending_without_library_goes_to_payment() {
    let next = next_status(
        RegistrationStatus::Pending,
        StatusAction::Submit,
        TransitionContext::new(false, false),
    );
    assert_eq!(next, Ok(RegistrationStatus::PaymentPending));
}

#[test]
fn test_approve_on_library_pending_completes() {
    let next = next_status(
        RegistrationStatus::LibraryPending,
        StatusAction::ApproveAndComplete,
        TransitionContext::new(true, false),
    );
    assert_eq!(next, Ok(RegistrationStatus::Completed));
}

#[test]
fn test_duplicate_reg_numbers_judged_per_row() {
    let roster = vec![
        create_student("Asha", "U34", Some(5)),
        create_student("Asha", "U34", None),
    ];
    let eligible = eligible_students(6, &[], &roster);
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].current_semester, 5);
}

// ============================================================================
// Properties
// ============================================================================

/// Roster with distinct registration numbers, each with an optional semester
fn roster_strategy() -> impl Strategy<Value = Vec<RosterStudent>> {
    (
        prop::collection::hash_set(0u32..40, 0..40),
        prop::collection::vec(prop::option::of(1u8..=8), 40),
    )
        .prop_map(|(numbers, semesters)| {
            numbers
                .into_iter()
                .zip(semesters)
                .enumerate()
                .map(|(i, (reg, semester))| {
                    create_student(&format!("S{i}"), &format!("U{reg}"), semester)
                })
                .collect()
        })
}

fn status_strategy() -> impl Strategy<Value = RegistrationStatus> {
    prop_oneof![
        Just(RegistrationStatus::Pending),
        Just(RegistrationStatus::LibraryPending),
        Just(RegistrationStatus::PaymentPending),
        Just(RegistrationStatus::Completed),
    ]
}

fn action_strategy() -> impl Strategy<Value = StatusAction> {
    prop_oneof![
        Just(StatusAction::Submit),
        Just(StatusAction::ClearLibrary),
        Just(StatusAction::MarkFeePaid),
        Just(StatusAction::ApproveAndComplete),
    ]
}

proptest! {
    #[test]
    fn prop_eligibility_complete(
        semester in 1u8..=8,
        roster in roster_strategy(),
        registered in prop::collection::hash_set(0u32..40, 0..20),
    ) {
        let registrations: Vec<_> = registered
            .iter()
            .map(|n| create_registration(&format!("r{n}"), "S", &format!("U{n}"), RegistrationStatus::Pending))
            .collect();
        let registered_numbers: HashSet<String> =
            registered.iter().map(|n| format!("U{n}")).collect();

        let eligible = eligible_students(semester, &registrations, &roster);
        let eligible_numbers: HashSet<&str> =
            eligible.iter().map(|s| s.university_reg_number.as_str()).collect();

        for student in &eligible {
            prop_assert!(!registered_numbers.contains(&student.university_reg_number));
        }

        for student in &roster {
            let should = student.current_semester == Some(previous_semester(semester))
                && !registered_numbers.contains(&student.university_reg_number);
            prop_assert_eq!(eligible_numbers.contains(student.university_reg_number.as_str()), should);
        }
    }

    #[test]
    fn prop_eligibility_idempotent(semester in 1u8..=8, roster in roster_strategy()) {
        let first = eligible_students(semester, &[], &roster);
        let second = eligible_students(semester, &[], &roster);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_completed_is_terminal(
        actions in prop::collection::vec(action_strategy(), 0..12),
        library_required in any::<bool>(),
        library_cleared in any::<bool>(),
    ) {
        let ctx = TransitionContext::new(library_required, library_cleared);
        let mut status = RegistrationStatus::Completed;
        for action in actions {
            if let Ok(next) = next_status(status, action, ctx) {
                status = next;
            }
            prop_assert_eq!(status, RegistrationStatus::Completed);
        }
    }

    #[test]
    fn prop_transitions_never_leave_completed(
        start in status_strategy(),
        actions in prop::collection::vec(action_strategy(), 0..12),
    ) {
        let ctx = TransitionContext::new(true, false);
        let mut status = start;
        let mut completed = status == RegistrationStatus::Completed;
        for action in actions {
            if let Ok(next) = next_status(status, action, ctx) {
                status = next;
            }
            if completed {
                prop_assert_eq!(status, RegistrationStatus::Completed);
            }
            completed |= status == RegistrationStatus::Completed;
        }
    }

    #[test]
    fn prop_validation_counts_each_rule(
        bad_semester in any::<bool>(),
        blank_year in any::<bool>(),
        bad_end in any::<bool>(),
        bad_deadline in any::<bool>(),
        zero_fee in any::<bool>(),
        no_courses in any::<bool>(),
    ) {
        let mut draft = create_test_draft();
        if bad_semester { draft.semester = 0; }
        if blank_year { draft.academic_year = "  ".to_string(); }
        if bad_end { draft.end_date = draft.start_date; }
        // Keep the deadline rule independent of whether the end date moved
        draft.fee_deadline = if bad_deadline { draft.end_date } else { date(2024, 9, 15) };
        if zero_fee { draft.fee_amount = 0; }
        if no_courses { draft.branches.clear(); }

        let expected = [bad_semester, blank_year, bad_end, bad_deadline, zero_fee, no_courses]
            .iter()
            .filter(|b| **b)
            .count();

        let reported = validate_session(&draft).err().map_or(0, |e| e.len());
        prop_assert_eq!(reported, expected);
    }
}
