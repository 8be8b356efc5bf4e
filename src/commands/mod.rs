pub mod registrations;
pub mod sessions;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use campusreg::api::{ApiClient, SessionContext};
use campusreg::config::Config;
use campusreg::models::{RegistrationSession, SessionDraft};
use campusreg::reconciler::RegistrationDesk;

// Re-export command functions for convenience
pub use registrations::{eligible, list_registrations, transition};
pub use sessions::{
    delete_session, edit_session, list_sessions, login, open_session, toggle_session,
    validate_session,
};

/// Settings shared by every command
pub struct Context {
    pub config: Config,
    token: Option<String>,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>, token: Option<String>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::from_file(&path)?,
            None => Config::from_env()?,
        };
        config.validate()?;

        let token = token.or_else(|| std::env::var("CAMPUSREG_TOKEN").ok());

        Ok(Self { config, token })
    }

    /// API client carrying the configured token, if any
    pub fn client(&self) -> Result<ApiClient> {
        let session = match &self.token {
            Some(token) => SessionContext::with_token(token.clone()),
            None => SessionContext::new(),
        };
        ApiClient::new(self.config.client_config(), session).context("Failed to create API client")
    }

    pub fn desk(&self) -> Result<RegistrationDesk<ApiClient>> {
        let client = self.client()?;
        RegistrationDesk::new(Arc::new(client), &self.config)
            .context("Failed to create registration desk")
    }
}

/// Read a session draft from a TOML or JSON file
pub fn load_draft(path: &Path) -> Result<SessionDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft file: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON draft: {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML draft: {}", path.display()))
    }
}

/// Find a session by its `sessionId` or record id
pub async fn find_session(
    desk: &RegistrationDesk<ApiClient>,
    id: &str,
) -> Result<RegistrationSession> {
    desk.sessions()
        .await?
        .into_iter()
        .find(|s| s.session_id == id || s.id == id)
        .with_context(|| format!("Session not found: {id}"))
}
