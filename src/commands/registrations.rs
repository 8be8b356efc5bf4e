use anyhow::{Context as _, Result};

use campusreg::api::RegistrationFilter;
use campusreg::models::RegistrationStatus;
use campusreg::reconciler::{audit_registrations, expected_status, StatusAction};

use super::sessions::report;
use super::{find_session, Context};

pub async fn list_registrations(
    ctx: &Context,
    session: Option<String>,
    semester: Option<u8>,
    status: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let status = status
        .map(|s| {
            RegistrationStatus::parse(&s).with_context(|| format!("Unknown status: {s}"))
        })
        .transpose()?;

    let desk = ctx.desk()?;
    let owner = match &session {
        Some(id) => Some(find_session(&desk, id).await?),
        None => None,
    };

    let filter = RegistrationFilter {
        session_id: owner.as_ref().map(|s| s.session_id.clone()),
        semester,
        status,
        search,
    };

    let client = ctx.client()?;
    let registrations = client
        .list_registrations(&filter)
        .await
        .map_err(|e| report(e.into()))?;

    if registrations.is_empty() {
        println!("No registrations found.");
        return Ok(());
    }

    let flagged = match &owner {
        Some(owner) => audit_registrations(owner, &registrations).len(),
        None => 0,
    };
    if flagged > 0 {
        println!("Warning: {flagged} registration(s) do not match their session\n");
    }

    println!("Found {} registrations:\n", registrations.len());
    for (i, reg) in registrations.iter().enumerate() {
        println!(
            "{}. {} ({}) -> semester {}",
            i + 1,
            reg.student_name,
            reg.university_reg_number,
            reg.registering_for_semester
        );
        println!(
            "   {} | fee {} | library {}",
            reg.status.label(),
            reg.fee_status,
            if reg.library_cleared { "cleared" } else { "not cleared" }
        );
    }

    Ok(())
}

pub async fn eligible(ctx: &Context, session_id: &str) -> Result<()> {
    let desk = ctx.desk()?;
    let session = find_session(&desk, session_id).await?;

    let students = desk.eligible_students(&session).await.map_err(report)?;

    if students.is_empty() {
        println!(
            "All eligible students have registered for {}.",
            session.session_id
        );
        return Ok(());
    }

    println!(
        "{} student(s) eligible for semester {} have not registered:\n",
        students.len(),
        session.semester
    );
    for student in &students {
        println!(
            "  {:<16} {:<28} {}",
            student.university_reg_number, student.name, student.email
        );
    }

    Ok(())
}

pub async fn transition(
    ctx: &Context,
    session_id: &str,
    registration_id: &str,
    action: &str,
) -> Result<()> {
    let action =
        StatusAction::parse(action).with_context(|| format!("Unknown action: {action}"))?;

    let desk = ctx.desk()?;
    let session = find_session(&desk, session_id).await?;
    desk.load(&session).await.map_err(report)?;

    let actions = desk.available_actions(registration_id).await;
    if !actions.contains(&action) {
        let names: Vec<&str> = actions.iter().map(StatusAction::as_str).collect();
        anyhow::bail!(
            "'{action}' is not available for {registration_id} (available: {})",
            if names.is_empty() { "none".to_string() } else { names.join(", ") }
        );
    }

    let updated = desk.apply(registration_id, action).await.map_err(report)?;
    println!(
        "{} ({}) is now {}",
        updated.student_name,
        updated.university_reg_number,
        updated.status.label()
    );

    let expected = expected_status(&updated, session.library_requirement);
    if expected != updated.status {
        tracing::warn!(
            registration = %updated.registration_id,
            stored = %updated.status,
            expected = %expected,
            "Stored status does not match library record"
        );
    }

    Ok(())
}
