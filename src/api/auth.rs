//! Login session context injected into the API client
//!
//! The context is created empty, initialized on login and torn down on
//! logout or when the backend reports the token as invalid. Clones share
//! the same underlying state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Logged-in user as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalUser {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// An authenticated session
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: Option<PortalUser>,
    pub started_at: DateTime<Utc>,
}

/// Shared holder for the current auth session
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl SessionContext {
    /// Create an empty (logged out) context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from an existing token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(AuthSession {
                token: token.into(),
                user: None,
                started_at: Utc::now(),
            }))),
        }
    }

    /// Start a session
    pub async fn init(&self, token: impl Into<String>, user: Option<PortalUser>) {
        let mut guard = self.inner.write().await;
        *guard = Some(AuthSession {
            token: token.into(),
            user,
            started_at: Utc::now(),
        });
    }

    /// End the session
    pub async fn teardown(&self) {
        let mut guard = self.inner.write().await;
        if guard.take().is_some() {
            tracing::info!("Login session ended");
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn user(&self) -> Option<PortalUser> {
        self.inner.read().await.as_ref().and_then(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_and_teardown() {
        let ctx = SessionContext::new();
        assert!(!ctx.is_authenticated().await);

        ctx.init("tok", None).await;
        assert_eq!(ctx.token().await.as_deref(), Some("tok"));

        ctx.teardown().await;
        assert!(ctx.token().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let ctx = SessionContext::with_token("abc");
        let other = ctx.clone();
        other.teardown().await;
        assert!(!ctx.is_authenticated().await);
    }
}
