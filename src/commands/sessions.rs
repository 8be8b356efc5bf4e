use anyhow::{Context as _, Result};
use std::path::Path;

use campusreg::error::Error;
use campusreg::reconciler::{validate_session as check_draft, ValidationErrors};

use super::{find_session, load_draft, Context};

pub async fn login(ctx: &Context, email: String, password: Option<String>) -> Result<()> {
    let password = password
        .or_else(|| std::env::var("CAMPUSREG_PASSWORD").ok())
        .context("Password required (--password or CAMPUSREG_PASSWORD)")?;

    let client = ctx.client()?;
    let session = match client.login(&email, &password).await {
        Ok(session) => session,
        Err(e) => anyhow::bail!(Error::from(e).user_message()),
    };

    if let Some(user) = &session.user {
        println!("Logged in as {} ({})", user.name, user.role);
    }
    println!("export CAMPUSREG_TOKEN={}", session.token);
    Ok(())
}

pub async fn list_sessions(ctx: &Context) -> Result<()> {
    let desk = ctx.desk()?;
    let sessions = desk.sessions().await.map_err(report)?;

    if sessions.is_empty() {
        println!("No registration sessions.");
        return Ok(());
    }

    println!("Registration sessions");
    println!("================================");
    for session in &sessions {
        println!(
            "{} | Semester {} | {} | {}",
            session.session_id,
            session.semester,
            session.academic_year,
            if session.is_active { "active" } else { "inactive" }
        );
        println!(
            "   {} to {} | fee {} due {}",
            session.start_date.format("%Y-%m-%d"),
            session.end_date.format("%Y-%m-%d"),
            session.fee_amount,
            session.fee_deadline.format("%Y-%m-%d")
        );
        println!(
            "   {} courses | library clearance: {}",
            session.available_courses.len(),
            if session.library_requirement { "required" } else { "not required" }
        );
    }

    Ok(())
}

pub fn validate_session(file: &Path) -> Result<()> {
    let draft = load_draft(file)?;

    match check_draft(&draft) {
        Ok(()) => {
            println!(
                "Draft is valid: semester {}, {} courses",
                draft.semester,
                draft.available_courses().len()
            );
            Ok(())
        }
        Err(errors) => {
            print_validation(&errors);
            anyhow::bail!("{} invalid field(s)", errors.len())
        }
    }
}

pub async fn open_session(ctx: &Context, file: &Path, with_notice: bool) -> Result<()> {
    let draft = load_draft(file)?;
    let desk = ctx.desk()?;

    let wants_default_notice = with_notice && draft.notice.is_none();

    let opened = desk.open_session(&draft).await.map_err(report)?;
    let mut notice = opened.notice;
    let mut notice_error = opened.notice_error;

    if wants_default_notice {
        // Default content needs the persisted session, so publish it afterwards
        let notice_draft = desk.notices().default_draft(&opened.session)?;
        let request = desk.notices().compose(&opened.session, &notice_draft);
        match ctx.client()?.create_notice(&request).await {
            Ok(created) => notice = Some(created),
            Err(e) => notice_error = Some(e),
        }
    }

    println!(
        "Opened session {} for semester {} ({} courses)",
        opened.session.session_id,
        opened.session.semester,
        opened.session.available_courses.len()
    );
    if let Some(notice) = notice {
        println!("Notice published: {}", notice.title);
    }
    if let Some(e) = notice_error {
        println!("Warning: notice was not published: {}", Error::from(e).user_message());
    }

    Ok(())
}

pub async fn edit_session(ctx: &Context, id: &str, file: &Path) -> Result<()> {
    let draft = load_draft(file)?;
    let desk = ctx.desk()?;

    let session = desk.edit_session(id, &draft).await.map_err(report)?;
    println!("Updated session {}", session.session_id);
    Ok(())
}

pub async fn toggle_session(ctx: &Context, id: &str) -> Result<()> {
    let desk = ctx.desk()?;
    let session = desk.toggle_session(id).await.map_err(report)?;
    println!(
        "Session {} is now {}",
        session.session_id,
        if session.is_active { "active" } else { "inactive" }
    );
    Ok(())
}

pub async fn delete_session(ctx: &Context, id: &str, force: bool) -> Result<()> {
    let desk = ctx.desk()?;
    let session = find_session(&desk, id).await?;

    if !force {
        let registrations = desk.load(&session).await.map_err(report)?;
        if !registrations.is_empty() {
            anyhow::bail!(
                "Session {} has {} registration(s) that would be orphaned; use --force to delete anyway",
                session.session_id,
                registrations.len()
            );
        }
    }

    let deleted = desk.delete_session(&session).await.map_err(report)?;
    println!(
        "Deleted session {} ({} registration(s) orphaned)",
        deleted.session_id, deleted.orphaned_registrations
    );
    Ok(())
}

fn print_validation(errors: &ValidationErrors) {
    println!("Session draft has {} problem(s):", errors.len());
    for error in errors.errors() {
        println!("  {:<18} {}", error.field.key(), error.message);
    }
}

/// Turn a library error into a user-facing anyhow error
pub(super) fn report(err: Error) -> anyhow::Error {
    if let Error::Validation(errors) = &err {
        print_validation(errors);
    }
    anyhow::anyhow!(err.user_message())
}
