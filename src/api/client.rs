//! HTTP client for the portal backend
//!
//! Every request goes through [`ApiClient::send`], which attaches the bearer
//! token from the injected [`SessionContext`], unwraps the backend's
//! `{success, data, message}` envelope and classifies failures.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::models::{
    Notice, NoticeRequest, Registration, RegistrationSession, RegistrationStatus, RosterStudent,
    SessionPayload, StatusUpdate,
};

use super::auth::{AuthSession, PortalUser, SessionContext};
use super::error::{is_invalid_token_message, ApiError};

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://localhost:5000/api`
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client config
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(15),
            user_agent: format!("campusreg/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Filters for listing registrations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFilter {
    pub session_id: Option<String>,
    pub semester: Option<u8>,
    pub status: Option<RegistrationStatus>,
    pub search: Option<String>,
}

impl RegistrationFilter {
    /// Filter on one session
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Default::default()
        }
    }

    pub fn with_semester(mut self, semester: u8) -> Self {
        self.semester = Some(semester);
        self
    }

    pub fn with_status(mut self, status: RegistrationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Query pairs; empty search terms are omitted
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.session_id {
            pairs.push(("sessionId", id.clone()));
        }
        if let Some(semester) = self.semester {
            pairs.push(("semester", semester.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                pairs.push(("search", search.to_string()));
            }
        }
        pairs
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    user: Option<PortalUser>,
}

// ============================================================================
// API Client
// ============================================================================

/// Client for the portal REST backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http_client: Client,
    session: SessionContext,
}

impl ApiClient {
    /// Create a new API client bound to a session context
    pub fn new(config: ClientConfig, session: SessionContext) -> Result<Self, ApiError> {
        Url::parse(&config.base_url)?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Init(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            session,
        })
    }

    /// The session context this client reads its token from
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Log in and initialize the session context
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let body = LoginRequest { email, password };
        let response: LoginResponse = self
            .send(Method::POST, "auth/login", &[], Some(&body), false)
            .await?;

        self.session
            .init(response.token.clone(), response.user.clone())
            .await;
        tracing::info!(email = %email, "Logged in");

        Ok(AuthSession {
            token: response.token,
            user: response.user,
            started_at: chrono::Utc::now(),
        })
    }

    /// End the local session
    pub async fn logout(&self) {
        self.session.teardown().await;
    }

    /// List all registration sessions
    pub async fn list_sessions(&self) -> Result<Vec<RegistrationSession>, ApiError> {
        self.send::<(), _>(Method::GET, "registration-sessions", &[], None, true)
            .await
    }

    /// Create a registration session
    pub async fn create_session(
        &self,
        payload: &SessionPayload,
    ) -> Result<RegistrationSession, ApiError> {
        self.send(Method::POST, "registration-sessions", &[], Some(payload), true)
            .await
    }

    /// Update a registration session's fields
    pub async fn update_session(
        &self,
        id: &str,
        payload: &SessionPayload,
    ) -> Result<RegistrationSession, ApiError> {
        let path = format!("registration-sessions/{id}");
        self.send(Method::PUT, &path, &[], Some(payload), true).await
    }

    /// Flip a session's `isActive` flag
    pub async fn toggle_session_status(&self, id: &str) -> Result<RegistrationSession, ApiError> {
        let path = format!("registration-sessions/{id}/toggle-status");
        self.send::<(), _>(Method::PATCH, &path, &[], None, true)
            .await
    }

    /// Delete a session record on the backend
    pub async fn delete_session(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("registration-sessions/{id}");
        let _: serde_json::Value = self
            .send::<(), _>(Method::DELETE, &path, &[], None, true)
            .await?;
        Ok(())
    }

    /// List registrations matching a filter
    pub async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<Registration>, ApiError> {
        self.send::<(), _>(Method::GET, "registrations", &filter.query_pairs(), None, true)
            .await
    }

    /// Set a registration's status
    pub async fn update_registration_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> Result<Registration, ApiError> {
        let path = format!("registrations/{id}/status");
        self.send(Method::PATCH, &path, &[], Some(update), true)
            .await
    }

    /// Fetch the student roster, optionally for one semester
    pub async fn list_students(&self, semester: Option<u8>) -> Result<Vec<RosterStudent>, ApiError> {
        let query: Vec<(&'static str, String)> = semester
            .map(|s| vec![("semester", s.to_string())])
            .unwrap_or_default();
        self.send::<(), _>(Method::GET, "students", &query, None, true)
            .await
    }

    /// Publish a notice
    pub async fn create_notice(&self, notice: &NoticeRequest) -> Result<Notice, ApiError> {
        self.send(Method::POST, "notices", &[], Some(notice), true)
            .await
    }

    // ------------------------------------------------------------------------
    // Request pipeline
    // ------------------------------------------------------------------------

    fn endpoint(&self, path: &str, query: &[(&'static str, String)]) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, query)?;
        let request_id = Uuid::new_v4();

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header("X-Request-Id", request_id.to_string());

        match self.session.token().await {
            Some(token) => request = request.bearer_auth(token),
            None if authenticated => return Err(ApiError::NotAuthenticated),
            None => {}
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%request_id, %method, url = %url, "Sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%request_id, error = %e, "Request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;

        tracing::debug!(%request_id, status = status.as_u16(), "Received response");

        if status.is_success() {
            return decode_success(&text);
        }

        let message = extract_message(&text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        if status == StatusCode::UNAUTHORIZED && is_invalid_token_message(&message) {
            tracing::warn!(%request_id, message = %message, "Token rejected, ending session");
            self.session.teardown().await;
            return Err(ApiError::SessionExpired(message));
        }

        tracing::warn!(%request_id, status = status.as_u16(), message = %message, "Request rejected");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Unwrap a 2xx body, with or without the `{success, data}` envelope
fn decode_success<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let value: serde_json::Value = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(text).map_err(|e| ApiError::InvalidResponse(e.to_string()))?
    };

    if let Some(obj) = value.as_object() {
        if obj.get("success").and_then(|v| v.as_bool()) == Some(false) {
            let message = obj
                .get("message")
                .or_else(|| obj.get("error"))
                .and_then(|v| v.as_str())
                .unwrap_or("Request failed")
                .to_string();
            return Err(ApiError::Rejected {
                status: 200,
                message,
            });
        }

        if let Some(data) = obj.get("data") {
            return serde_json::from_value(data.clone())
                .map_err(|e| ApiError::InvalidResponse(e.to_string()));
        }
    }

    serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Pull `message` or `error` out of an error body
fn extract_message(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================
