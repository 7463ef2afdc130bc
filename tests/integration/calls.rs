//! Integration tests for single calls: encoding and response handling

use crate::integration::mock_server::{MockServerFixture, TOKEN};
use mockito::Matcher;
use serde_json::json;
use studio_rpc::{HttpMethod, SessionStore};

#[tokio::test]
async fn test_get_tasks_returns_data_array() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/exec")
        .match_query(Matcher::UrlEncoded("action".into(), "getTasks".into()))
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .with_status(200)
        .with_body(r#"{"data":[{"id":1,"title":"T"}]}"#)
        .create_async()
        .await;

    let data = fixture
        .client()
        .call("getTasks", json!({}), Some(HttpMethod::Get))
        .await
        .unwrap();

    assert_eq!(data, json!([{"id": 1, "title": "T"}]));
    assert!(fixture.events.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_flattens_payload_into_query() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/exec")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "getScripts".into()),
            Matcher::UrlEncoded("status".into(), "in review".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"result":[]}"#)
        .create_async()
        .await;

    let data = fixture
        .client()
        .call("getScripts", json!({"status": "in review", "limit": 20}), None)
        .await
        .unwrap();

    assert_eq!(data, json!([]));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_sends_action_payload_and_token() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/exec")
        .match_query(Matcher::UrlEncoded("action".into(), "createTask".into()))
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "action": "createTask",
            "payload": {"title": "X", "assignees": ["ana", "li"]},
            "token": TOKEN,
        })))
        .with_status(200)
        .with_body(r#"{"status":"success","data":{"id":7}}"#)
        .create_async()
        .await;

    let data = fixture
        .client()
        .call(
            "createTask",
            json!({"title": "X", "assignees": ["ana", "li"]}),
            None,
        )
        .await
        .unwrap();

    assert_eq!(data, json!({"id": 7}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_embedded_placement_sends_no_authorization_header() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/exec")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "getDashboardStats".into()),
            Matcher::UrlEncoded("token".into(), TOKEN.into()),
        ]))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"data":{"tasks":4}}"#)
        .create_async()
        .await;

    let data = fixture
        .embedded_client()
        .call("getDashboardStats", json!(null), None)
        .await
        .unwrap();

    assert_eq!(data, json!({"tasks": 4}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_sign_in_action_works_without_credential() {
    let mut fixture = MockServerFixture::signed_out().await;
    let mock = fixture
        .mock_post("sendVerificationCode", 200, r#"{"data":{"sent":true}}"#)
        .await;

    let data = fixture
        .client()
        .call("sendVerificationCode", json!({"email": "a@studio.test"}), None)
        .await
        .unwrap();

    assert_eq!(data, json!({"sent": true}));
    assert!(!fixture.session.is_signed_in());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_explicit_method_overrides_catalog() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_post("getTasks", 200, r#"{"data":[]}"#)
        .await;

    fixture
        .client()
        .call("getTasks", json!({"filter": {"open": true}}), Some(HttpMethod::Post))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_envelope_without_data_is_returned_whole() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_get("getUserProfile", 200, r#"{"name":"Ana","role":"editor"}"#)
        .await;

    let data = fixture
        .client()
        .call("getUserProfile", json!({}), None)
        .await
        .unwrap();

    assert_eq!(data, json!({"name": "Ana", "role": "editor"}));
}

#[tokio::test]
async fn test_upload_file_sends_data_url_payload() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/exec")
        .match_query(Matcher::UrlEncoded("action".into(), "uploadFile".into()))
        .match_body(Matcher::PartialJson(json!({
            "action": "uploadFile",
            "payload": {
                "filename": "notes.txt",
                "content": "data:text/plain;base64,aGVsbG8=",
                "type": "script",
            },
            "token": TOKEN,
        })))
        .with_status(200)
        .with_body(r#"{"data":{"url":"https://files.test/notes.txt"}}"#)
        .create_async()
        .await;

    let data = fixture
        .client()
        .upload_file("notes.txt", b"hello", "text/plain", "script")
        .await
        .unwrap();

    assert_eq!(data, json!({"url": "https://files.test/notes.txt"}));
    mock.assert_async().await;
}
