//! Registration desk: admin workflows over the backend
//!
//! The desk keeps the registration list of one session in memory and
//! applies status actions without optimistic updates: the view changes only
//! after the backend confirms, and it is refreshed from the backend before
//! the action returns. Only one action per registration may be in flight.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{ApiError, RegistrationFilter};
use crate::config::{Config, PortalConfig};
use crate::error::Result;
use crate::models::{
    EligibleStudent, Notice, Registration, RegistrationIssue, RegistrationSession, SessionDraft,
    StatusUpdate,
};
use crate::notice::NoticeComposer;

use super::backend::RegistrationBackend;
use super::eligibility::{eligible_for_session, previous_semester};
use super::status::{allowed_actions, plan_update, StatusAction, TransitionContext, TransitionError};
use super::validation::session_payload;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of opening a registration session
#[derive(Debug)]
pub struct OpenedSession {
    pub session: RegistrationSession,

    /// Notice published with the session, if one was requested and created
    pub notice: Option<Notice>,

    /// Why the requested notice could not be created
    pub notice_error: Option<ApiError>,
}

/// Result of deleting a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub session_id: String,

    /// Registrations left pointing at the deleted session
    pub orphaned_registrations: usize,
}

/// Registrations that contradict their session, with what is wrong
///
/// Each offending registration is logged. Nothing is filtered out; callers
/// still show every record.
pub fn audit_registrations<'a>(
    session: &RegistrationSession,
    registrations: &'a [Registration],
) -> Vec<(&'a Registration, Vec<RegistrationIssue>)> {
    registrations
        .iter()
        .filter_map(|registration| {
            let issues = registration.check_against(session);
            if issues.is_empty() {
                return None;
            }
            let summary: Vec<String> = issues.iter().map(ToString::to_string).collect();
            warn!(
                session_id = %session.session_id,
                registration = %registration.registration_id,
                issues = %summary.join("; "),
                "Registration inconsistent with its session"
            );
            Some((registration, issues))
        })
        .collect()
}

// ============================================================================
// In-flight tracking
// ============================================================================

type InFlightSet = Arc<Mutex<HashSet<String>>>;

/// Marks a registration busy until dropped
struct InFlightGuard {
    set: InFlightSet,
    key: String,
}

impl InFlightGuard {
    fn acquire(set: &InFlightSet, key: &str) -> std::result::Result<Self, TransitionError> {
        let mut busy = set.lock().unwrap_or_else(|e| e.into_inner());
        if !busy.insert(key.to_string()) {
            return Err(TransitionError::InFlight(key.to_string()));
        }
        Ok(Self {
            set: Arc::clone(set),
            key: key.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut busy = self.set.lock().unwrap_or_else(|e| e.into_inner());
        busy.remove(&self.key);
    }
}

// ============================================================================
// Desk
// ============================================================================

#[derive(Debug, Default)]
struct DeskView {
    session: Option<RegistrationSession>,
    registrations: Vec<Registration>,
}

impl DeskView {
    fn find(&self, id: &str) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.id == id || r.registration_id == id)
    }

    fn shows(&self, session_id: &str) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.session_id == session_id)
    }

    fn library_required_for(&self, registration: &Registration) -> bool {
        self.session
            .as_ref()
            .filter(|s| s.session_id == registration.session_id)
            .map(|s| s.library_requirement)
            .unwrap_or(false)
    }
}

/// Key the backend addresses a registration by
fn record_key(registration: &Registration) -> &str {
    if registration.id.is_empty() {
        &registration.registration_id
    } else {
        &registration.id
    }
}

/// Admin workflows for registration sessions
pub struct RegistrationDesk<B> {
    backend: Arc<B>,
    notices: NoticeComposer<'static>,
    portal: PortalConfig,
    view: RwLock<DeskView>,
    in_flight: InFlightSet,
}

impl<B: RegistrationBackend> RegistrationDesk<B> {
    pub fn new(backend: Arc<B>, config: &Config) -> Result<Self> {
        Ok(Self {
            backend,
            notices: NoticeComposer::new(config.portal.notice.clone())?,
            portal: config.portal.clone(),
            view: RwLock::new(DeskView::default()),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    pub fn notices(&self) -> &NoticeComposer<'static> {
        &self.notices
    }

    // ------------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------------

    pub async fn sessions(&self) -> Result<Vec<RegistrationSession>> {
        Ok(self.backend.list_sessions().await?)
    }

    /// Validate a draft, create the session and publish its notice
    ///
    /// Nothing is sent when validation fails. A notice failure does not undo
    /// the created session; it is reported in [`OpenedSession::notice_error`].
    pub async fn open_session(&self, draft: &SessionDraft) -> Result<OpenedSession> {
        let payload = session_payload(draft, &self.portal)?;
        let session = self.backend.create_session(&payload).await?;
        info!(
            session_id = %session.session_id,
            semester = session.semester,
            courses = session.available_courses.len(),
            "Registration session opened"
        );

        let mut opened = OpenedSession {
            session,
            notice: None,
            notice_error: None,
        };

        if let Some(notice_draft) = &draft.notice {
            let request = self.notices.compose(&opened.session, notice_draft);
            match self.backend.create_notice(&request).await {
                Ok(notice) => {
                    info!(title = %notice.title, "Registration notice published");
                    opened.notice = Some(notice);
                }
                Err(e) => {
                    warn!(
                        session_id = %opened.session.session_id,
                        error = %e,
                        "Session created but notice failed"
                    );
                    opened.notice_error = Some(e);
                }
            }
        }

        Ok(opened)
    }

    /// Validate an edited draft and update the session
    pub async fn edit_session(&self, id: &str, draft: &SessionDraft) -> Result<RegistrationSession> {
        let payload = session_payload(draft, &self.portal)?;
        let session = self.backend.update_session(id, &payload).await?;
        info!(session_id = %session.session_id, "Registration session updated");

        self.replace_session(&session).await;
        Ok(session)
    }

    /// Flip a session between active and inactive
    pub async fn toggle_session(&self, id: &str) -> Result<RegistrationSession> {
        let session = self.backend.toggle_session_status(id).await?;
        info!(
            session_id = %session.session_id,
            is_active = session.is_active,
            "Registration session status toggled"
        );

        self.replace_session(&session).await;
        Ok(session)
    }

    /// Delete a session, reporting how many registrations it orphans
    pub async fn delete_session(&self, session: &RegistrationSession) -> Result<DeletionReport> {
        let registrations = self
            .backend
            .list_registrations(&RegistrationFilter::for_session(&session.session_id))
            .await?;

        if !registrations.is_empty() {
            warn!(
                session_id = %session.session_id,
                orphaned = registrations.len(),
                "Deleting session with registrations; they will be orphaned"
            );
        }

        self.backend.delete_session(&session.id).await?;
        info!(session_id = %session.session_id, "Registration session deleted");

        let mut view = self.view.write().await;
        if view.shows(&session.session_id) {
            *view = DeskView::default();
        }

        Ok(DeletionReport {
            session_id: session.session_id.clone(),
            orphaned_registrations: registrations.len(),
        })
    }

    // ------------------------------------------------------------------------
    // Registrations
    // ------------------------------------------------------------------------

    /// Load a session's registrations into the view
    ///
    /// Records that contradict the session are logged but still loaded.
    pub async fn load(&self, session: &RegistrationSession) -> Result<Vec<Registration>> {
        let registrations = self
            .backend
            .list_registrations(&RegistrationFilter::for_session(&session.session_id))
            .await?;
        audit_registrations(session, &registrations);

        let mut view = self.view.write().await;
        view.session = Some(session.clone());
        view.registrations = registrations.clone();
        Ok(registrations)
    }

    /// Re-fetch the current session's registrations
    pub async fn refresh(&self) -> Result<Vec<Registration>> {
        let session = self.view.read().await.session.clone();
        match session {
            Some(session) => self.load(&session).await,
            None => Ok(Vec::new()),
        }
    }

    /// Snapshot of the loaded registrations
    pub async fn registrations(&self) -> Vec<Registration> {
        self.view.read().await.registrations.clone()
    }

    /// Actions to enable for a registration; none while one is in flight
    pub async fn available_actions(&self, id: &str) -> Vec<StatusAction> {
        let view = self.view.read().await;
        let Some(registration) = view.find(id) else {
            return Vec::new();
        };

        if self.is_in_flight(record_key(registration)) {
            return Vec::new();
        }

        allowed_actions(registration.status).to_vec()
    }

    /// Apply a status action and refresh the view once it is confirmed
    ///
    /// On failure the view is left exactly as it was.
    pub async fn apply(&self, id: &str, action: StatusAction) -> Result<Registration> {
        let key = {
            let view = self.view.read().await;
            let registration = view
                .find(id)
                .ok_or_else(|| TransitionError::UnknownRegistration(id.to_string()))?;
            record_key(registration).to_string()
        };

        let _guard = InFlightGuard::acquire(&self.in_flight, &key)?;

        let (update, session_id, from) = {
            let view = self.view.read().await;
            let registration = view
                .find(&key)
                .ok_or_else(|| TransitionError::UnknownRegistration(id.to_string()))?;
            let ctx = TransitionContext::new(
                view.library_required_for(registration),
                registration.library_cleared,
            );
            let update: StatusUpdate = plan_update(registration.status, action, ctx)?;
            let session_id = view
                .session
                .as_ref()
                .map_or(&registration.session_id, |s| &s.session_id)
                .clone();
            (update, session_id, registration.status)
        };

        info!(
            registration = %key,
            action = %action,
            from = %from,
            to = %update.status,
            "Applying registration action"
        );

        let confirmed = match self.backend.update_registration_status(&key, &update).await {
            Ok(registration) => registration,
            Err(e) => {
                warn!(registration = %key, action = %action, error = %e, "Registration action failed");
                return Err(e.into());
            }
        };

        // Another session may have been loaded meanwhile; only refresh our own
        match self
            .backend
            .list_registrations(&RegistrationFilter::for_session(&session_id))
            .await
        {
            Ok(registrations) => {
                let mut view = self.view.write().await;
                if view.shows(&session_id) {
                    view.registrations = registrations;
                } else {
                    debug!(session_id = %session_id, "View moved to another session, refresh dropped");
                }
            }
            Err(e) => {
                warn!(error = %e, "Refresh after action failed, keeping confirmed record");
                let mut view = self.view.write().await;
                if view.shows(&session_id) {
                    if let Some(slot) = view
                        .registrations
                        .iter_mut()
                        .find(|r| record_key(r) == key)
                    {
                        *slot = confirmed.clone();
                    }
                }
            }
        }

        Ok(confirmed)
    }

    // ------------------------------------------------------------------------
    // Eligibility
    // ------------------------------------------------------------------------

    /// Students who may still register for `session`
    pub async fn eligible_students(
        &self,
        session: &RegistrationSession,
    ) -> Result<Vec<EligibleStudent>> {
        let filter = RegistrationFilter::for_session(&session.session_id);
        let (registrations, roster) = tokio::try_join!(
            self.backend.list_registrations(&filter),
            self.backend
                .list_students(Some(previous_semester(session.semester))),
        )?;

        Ok(eligible_for_session(session, &registrations, &roster))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }

    async fn replace_session(&self, session: &RegistrationSession) {
        let mut view = self.view.write().await;
        if let Some(current) = view.session.as_mut() {
            if current.session_id == session.session_id {
                *current = session.clone();
            }
        }
    }
}
