//! Integration tests for ApiClient using wiremock
//!
//! These tests validate token handling, envelope decoding and error
//! classification against a mock backend.

use std::time::Duration;

use campusreg::api::{ApiClient, ApiError, ClientConfig, RegistrationFilter, SessionContext};
use campusreg::models::{FeeStatus, RegistrationStatus, StatusUpdate};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_json() -> serde_json::Value {
    json!({
        "_id": "665f1c2a9b1e8a0012ab34cd",
        "sessionId": "SES-2024-S5",
        "semester": 5,
        "academicYear": "2024-25",
        "startDate": "2024-08-01T00:00:00Z",
        "endDate": "2024-08-31T00:00:00Z",
        "feeDeadline": "2024-09-15T00:00:00Z",
        "feeAmount": 45000,
        "availableCourses": ["CS501", "CS502"],
        "libraryRequirement": true,
        "isActive": true
    })
}

fn registration_json(status: &str) -> serde_json::Value {
    json!({
        "_id": "r1",
        "registrationId": "REG-r1",
        "sessionId": "SES-2024-S5",
        "universityRegNumber": "U2021001",
        "studentName": "Asha",
        "email": "asha@college.edu",
        "phone": "9800000000",
        "currentSemester": 4,
        "registeringForSemester": 5,
        "selectedCourses": ["CS501"],
        "status": status,
        "feeStatus": "pending",
        "libraryCleared": false,
        "registeredAt": "2024-08-05T10:00:00Z"
    })
}

fn client_for(server: &MockServer, session: SessionContext) -> ApiClient {
    let config = ClientConfig::new(format!("{}/api", server.uri()));
    ApiClient::new(config, session).unwrap()
}

/// Test that the bearer token is attached and the envelope unwrapped
#[tokio::test]
async fn test_list_sessions_with_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/registration-sessions"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": [session_json()]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionContext::with_token("tok-123"));
    let sessions = client.list_sessions().await.unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, "SES-2024-S5");
    assert!(sessions[0].library_requirement);
}

/// Test that an invalid token ends the session
#[tokio::test]
async fn test_invalid_token_tears_down_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/registration-sessions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Invalid token"})),
        )
        .mount(&mock_server)
        .await;

    let session = SessionContext::with_token("stale");
    let client = client_for(&mock_server, session.clone());
    let result = client.list_sessions().await;

    assert!(matches!(result, Err(ApiError::SessionExpired(_))));
    assert!(!session.is_authenticated().await);
}

/// Test that a permission-scoped 401 keeps the session
#[tokio::test]
async fn test_permission_401_keeps_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Not authorized to view students"})),
        )
        .mount(&mock_server)
        .await;

    let session = SessionContext::with_token("tok");
    let client = client_for(&mock_server, session.clone());
    let result = client.list_students(Some(4)).await;

    match result {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Not authorized to view students");
        }
        other => panic!("Expected rejection, got {other:?}"),
    }
    assert!(session.is_authenticated().await);
}

/// Test that backend business rejections come through verbatim
#[tokio::test]
async fn test_business_rejection_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/registrations/r1/status"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            json!({"success": false, "message": "Cannot complete registration with unpaid fees"}),
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionContext::with_token("tok"));
    let update = StatusUpdate {
        status: RegistrationStatus::Completed,
        fee_status: None,
        library_cleared: None,
    };
    let err = client
        .update_registration_status("r1", &update)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Cannot complete registration with unpaid fees");
    assert!(!err.is_transport());
}

/// Test the status update body and decoded result
#[tokio::test]
async fn test_update_status_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/registrations/r1/status"))
        .and(body_json(json!({"status": "completed", "feeStatus": "paid"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"success": true, "data": registration_json("completed")}),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionContext::with_token("tok"));
    let update = StatusUpdate {
        status: RegistrationStatus::Completed,
        fee_status: Some(FeeStatus::Paid),
        library_cleared: None,
    };
    let registration = client.update_registration_status("r1", &update).await.unwrap();

    assert_eq!(registration.status, RegistrationStatus::Completed);
}

/// Test that registration filters become query parameters
#[tokio::test]
async fn test_registration_filter_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/registrations"))
        .and(query_param("sessionId", "SES-2024-S5"))
        .and(query_param("status", "library_pending"))
        .and(query_param("search", "asha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"success": true, "data": [registration_json("library_pending")]}),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionContext::with_token("tok"));
    let filter = RegistrationFilter::for_session("SES-2024-S5")
        .with_status(RegistrationStatus::LibraryPending)
        .with_search("asha");
    let registrations = client.list_registrations(&filter).await.unwrap();

    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].status, RegistrationStatus::LibraryPending);
}

/// Test that roster rows are normalized on ingestion
#[tokio::test]
async fn test_roster_semester_normalized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"name": "Asha", "universityRegNumber": "U1", "email": "a@c", "currentSemester": 4},
                {"name": "Bala", "universityRegNumber": "U2", "email": "b@c", "course": {"semester": 4}},
                {"name": "Chen", "universityRegNumber": "U3", "email": "c@c"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionContext::with_token("tok"));
    let roster = client.list_students(None).await.unwrap();

    let semesters: Vec<_> = roster.iter().map(|s| s.current_semester).collect();
    assert_eq!(semesters, vec![Some(4), Some(4), None]);
}

/// Test that login initializes the injected session context
#[tokio::test]
async fn test_login_initializes_context() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "admin@college.edu", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh-token",
            "user": {"_id": "u1", "name": "Admin", "email": "admin@college.edu", "role": "admin"}
        })))
        .mount(&mock_server)
        .await;

    let session = SessionContext::new();
    let client = client_for(&mock_server, session.clone());
    let auth = client.login("admin@college.edu", "pw").await.unwrap();

    assert_eq!(auth.token, "fresh-token");
    assert_eq!(session.token().await.as_deref(), Some("fresh-token"));
    assert_eq!(session.user().await.map(|u| u.role).as_deref(), Some("admin"));

    client.logout().await;
    assert!(!session.is_authenticated().await);
}

/// Test that authenticated calls without a token are never sent
#[tokio::test]
async fn test_missing_token_not_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionContext::new());
    let result = client.list_sessions().await;

    assert!(matches!(result, Err(ApiError::NotAuthenticated)));
}

/// Test that a slow backend surfaces as a transport error
#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/registration-sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(format!("{}/api", mock_server.uri()))
        .with_timeout(Duration::from_millis(100));
    let client = ApiClient::new(config, SessionContext::with_token("tok")).unwrap();
    let err = client.list_sessions().await.unwrap_err();

    assert!(err.is_transport(), "Expected transport error, got {err:?}");
}

/// Test that a 2xx body of the wrong shape is an invalid response
#[tokio::test]
async fn test_malformed_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/registration-sessions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"oops": 1}})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, SessionContext::with_token("tok"));
    let result = client.list_sessions().await;

    assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
}
