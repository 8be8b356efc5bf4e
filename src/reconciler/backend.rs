//! Backend operations the registration desk depends on

use async_trait::async_trait;

use crate::api::{ApiClient, ApiError, RegistrationFilter};
use crate::models::{
    Notice, NoticeRequest, Registration, RegistrationSession, RosterStudent, SessionPayload,
    StatusUpdate,
};

/// Remote operations used by [`super::RegistrationDesk`]
#[async_trait]
pub trait RegistrationBackend: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<RegistrationSession>, ApiError>;

    async fn create_session(
        &self,
        payload: &SessionPayload,
    ) -> Result<RegistrationSession, ApiError>;

    async fn update_session(
        &self,
        id: &str,
        payload: &SessionPayload,
    ) -> Result<RegistrationSession, ApiError>;

    async fn toggle_session_status(&self, id: &str) -> Result<RegistrationSession, ApiError>;

    async fn delete_session(&self, id: &str) -> Result<(), ApiError>;

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<Registration>, ApiError>;

    async fn update_registration_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> Result<Registration, ApiError>;

    async fn list_students(&self, semester: Option<u8>) -> Result<Vec<RosterStudent>, ApiError>;

    async fn create_notice(&self, notice: &NoticeRequest) -> Result<Notice, ApiError>;
}

#[async_trait]
impl RegistrationBackend for ApiClient {
    async fn list_sessions(&self) -> Result<Vec<RegistrationSession>, ApiError> {
        ApiClient::list_sessions(self).await
    }

    async fn create_session(
        &self,
        payload: &SessionPayload,
    ) -> Result<RegistrationSession, ApiError> {
        ApiClient::create_session(self, payload).await
    }

    async fn update_session(
        &self,
        id: &str,
        payload: &SessionPayload,
    ) -> Result<RegistrationSession, ApiError> {
        ApiClient::update_session(self, id, payload).await
    }

    async fn toggle_session_status(&self, id: &str) -> Result<RegistrationSession, ApiError> {
        ApiClient::toggle_session_status(self, id).await
    }

    async fn delete_session(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::delete_session(self, id).await
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<Registration>, ApiError> {
        ApiClient::list_registrations(self, filter).await
    }

    async fn update_registration_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> Result<Registration, ApiError> {
        ApiClient::update_registration_status(self, id, update).await
    }

    async fn list_students(&self, semester: Option<u8>) -> Result<Vec<RosterStudent>, ApiError> {
        ApiClient::list_students(self, semester).await
    }

    async fn create_notice(&self, notice: &NoticeRequest) -> Result<Notice, ApiError> {
        ApiClient::create_notice(self, notice).await
    }
}
