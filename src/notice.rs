//! Registration notices published alongside a new session

use handlebars::Handlebars;
use serde::Serialize;

use crate::config::NoticeConfig;
use crate::error::Result;
use crate::models::{NoticeDraft, NoticeRequest, RegistrationSession};

/// Default notice body
const DEFAULT_TEMPLATE: &str = include_str!("../templates/registration_notice.hbs");

#[derive(Debug, Serialize)]
struct NoticeTemplateData<'a> {
    semester: u8,
    academic_year: &'a str,
    start_date: String,
    end_date: String,
    fee_deadline: String,
    fee_amount: u64,
    library_requirement: bool,
    courses: &'a [String],
}

impl<'a> From<&'a RegistrationSession> for NoticeTemplateData<'a> {
    fn from(session: &'a RegistrationSession) -> Self {
        Self {
            semester: session.semester,
            academic_year: &session.academic_year,
            start_date: session.start_date.format("%d %b %Y").to_string(),
            end_date: session.end_date.format("%d %b %Y").to_string(),
            fee_deadline: session.fee_deadline.format("%d %b %Y").to_string(),
            fee_amount: session.fee_amount,
            library_requirement: session.library_requirement,
            courses: &session.available_courses,
        }
    }
}

/// Builds notice requests for opened sessions
pub struct NoticeComposer<'a> {
    handlebars: Handlebars<'a>,
    defaults: NoticeConfig,
}

impl<'a> NoticeComposer<'a> {
    pub fn new(defaults: NoticeConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string("registration_notice", DEFAULT_TEMPLATE)?;

        Ok(Self {
            handlebars,
            defaults,
        })
    }

    /// Default title for a session's notice
    pub fn default_title(session: &RegistrationSession) -> String {
        format!(
            "Semester {} registration open ({})",
            session.semester, session.academic_year
        )
    }

    /// Render the default notice body for a session
    pub fn render_content(&self, session: &RegistrationSession) -> Result<String> {
        let data = NoticeTemplateData::from(session);
        Ok(self.handlebars.render("registration_notice", &data)?)
    }

    /// Draft with default title and rendered content
    pub fn default_draft(&self, session: &RegistrationSession) -> Result<NoticeDraft> {
        Ok(NoticeDraft {
            title: Self::default_title(session),
            content: self.render_content(session)?,
        })
    }

    /// Notice request for `session`, visible for the registration window
    pub fn compose(&self, session: &RegistrationSession, draft: &NoticeDraft) -> NoticeRequest {
        NoticeRequest {
            title: draft.title.trim().to_string(),
            content: draft.content.trim().to_string(),
            kind: self.defaults.kind.clone(),
            priority: self.defaults.priority.clone(),
            target_audience: self.defaults.target_audience.clone(),
            start_date: session.start_date,
            end_date: session.end_date,
            links: Vec::new(),
            signed_by: self.defaults.signed_by.clone(),
        }
    }
}
