//! Integration tests for failure classification, session invalidation and events

use crate::integration::mock_server::MockServerFixture;
use serde_json::json;
use std::time::Duration;
use studio_rpc::{ClientEvent, ErrorKind, SessionStore};

#[tokio::test]
async fn test_missing_credential_fails_without_network() {
    let mut fixture = MockServerFixture::signed_out().await;
    let mock = fixture
        .server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = fixture
        .client()
        .call("getTasks", json!({}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthMissing);
    let failures = fixture.events.failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0],
        ClientEvent::Failure { kind: ErrorKind::AuthMissing, .. }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_signals_redirect() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_post("createTask", 200, r#"{"error":"unauthorized"}"#)
        .await;

    let client = fixture
        .builder()
        .login_redirect_delay(Duration::from_millis(2000))
        .build()
        .unwrap();
    let err = client
        .call("createTask", json!({"title": "X"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!fixture.session.is_signed_in());

    let events = fixture.events.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        ClientEvent::SessionInvalidated {
            action: "createTask".into(),
            redirect_after: Duration::from_millis(2000),
        }
    );
    assert!(matches!(
        &events[1],
        ClientEvent::Failure { kind: ErrorKind::Unauthorized, .. }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_http_error() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_get("getTasks", 500, "Internal Server Error")
        .await;

    let err = fixture
        .client()
        .call("getTasks", json!({}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::HttpError);
    assert_eq!(err.status(), Some(500));
    assert!(fixture.session.is_signed_in());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_backend_error_message_is_remote_failure() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_post("deleteTask", 200, r#"{"error":"Task not found"}"#)
        .await;

    let err = fixture
        .client()
        .call("deleteTask", json!({"id": 99}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(
        fixture.events.failures(),
        vec![ClientEvent::Failure {
            action: "deleteTask".into(),
            kind: ErrorKind::Remote,
            message: "Task not found".into(),
        }]
    );
    assert!(fixture.session.is_signed_in());
}

#[tokio::test]
async fn test_non_json_body_is_protocol_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_get("getTasks", 200, "<html>Sign in</html>")
        .await;

    let err = fixture
        .client()
        .call("getTasks", json!({}), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolError);
}

#[tokio::test]
async fn test_nested_get_payload_is_rejected_before_sending() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = fixture
        .client()
        .call("getTasks", json!({"filter": {"status": "open"}}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(fixture.events.failures().len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retry_exhaustion_returns_last_failure_and_one_event() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/exec")
        .match_query(mockito::Matcher::UrlEncoded(
            "action".into(),
            "getTasks".into(),
        ))
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let err = fixture
        .client()
        .call_with_retry("getTasks", json!({}), 3)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::HttpError);
    assert_eq!(err.status(), Some(503));
    assert_eq!(fixture.events.failures().len(), 1);
    mock.assert_async().await;
}

#[derive(Default)]
struct SlotVault {
    slot: std::sync::Mutex<Option<studio_rpc::Credential>>,
}

impl studio_rpc::CredentialVault for SlotVault {
    fn load(&self) -> Option<studio_rpc::Credential> {
        self.slot.lock().unwrap().clone()
    }

    fn save(&self, credential: &studio_rpc::Credential) {
        *self.slot.lock().unwrap() = Some(credential.clone());
    }

    fn remove(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

#[tokio::test]
async fn test_unauthorized_removes_persisted_credential() {
    use studio_rpc::{Credential, CredentialVault, PersistedSession};

    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_get("getTasks", 200, r#"{"error":"unauthorized"}"#)
        .await;

    let vault = SlotVault::default();
    vault.save(&Credential::new("stale-token"));
    let session = std::sync::Arc::new(PersistedSession::open(vault));

    let client = fixture.builder().session(session.clone()).build().unwrap();
    let err = client
        .call("getTasks", json!({}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!session.is_signed_in());
    assert!(session.vault().load().is_none());
    mock.assert_async().await;
}
