//! Integration tests for batch API

use crate::integration::mock_server::MockServerFixture;
use serde_json::json;
use studio_rpc::{BatchOptions, CallRequest, ErrorKind};

#[tokio::test]
async fn test_batch_execution_order_preserving_with_partial_failure() {
    let mut fixture = MockServerFixture::new().await;
    let _tasks = fixture.mock_get("getTasks", 200, r#"{"data":["t1"]}"#).await;
    let _scripts = fixture.mock_get("getScripts", 200, r#"{"data":["s1"]}"#).await;
    let _ideas = fixture.mock_get("getIdeas", 500, "boom").await;
    let _users = fixture.mock_get("getUsers", 200, r#"{"data":["u1"]}"#).await;

    let requests = vec![
        CallRequest::new("getTasks"),
        CallRequest::new("getScripts"),
        CallRequest::new("getIdeas"),
        CallRequest::new("getUsers"),
    ];
    let outcome = fixture.client().batch_call(requests).await;

    assert_eq!(outcome.len(), 4);
    let actions: Vec<&str> = outcome.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["getTasks", "getScripts", "getIdeas", "getUsers"]);

    assert_eq!(outcome.entries[0].data, Some(json!(["t1"])));
    assert_eq!(outcome.entries[1].data, Some(json!(["s1"])));
    assert_eq!(outcome.entries[3].data, Some(json!(["u1"])));

    let failed = &outcome.entries[2];
    assert!(!failed.succeeded);
    let failure = failed.error.as_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::HttpError);
    assert_eq!(failure.status, Some(500));

    assert_eq!(outcome.success_count(), 3);
    assert_eq!(outcome.failure_count(), 1);
    assert_eq!(fixture.events.failures().len(), 1);
}

#[tokio::test]
async fn test_batch_concurrency_limit() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/exec")
        .match_query(mockito::Matcher::UrlEncoded(
            "action".into(),
            "getPerformance".into(),
        ))
        .with_status(200)
        .with_body(r#"{"data":{"views":1}}"#)
        .expect(5)
        .create_async()
        .await;

    let requests = (0..5)
        .map(|i| CallRequest::new("getPerformance").field("week", i))
        .collect();
    let outcome = fixture
        .client()
        .batch_call_with(requests, BatchOptions::default().with_concurrency_limit(2))
        .await;

    assert!(outcome.all_succeeded());
    assert_eq!(outcome.len(), 5);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_batch_mixes_methods() {
    let mut fixture = MockServerFixture::new().await;
    let _get = fixture.mock_get("getTasks", 200, r#"{"data":[]}"#).await;
    let _post = fixture
        .mock_post("addPerformance", 200, r#"{"data":{"id":"p1"}}"#)
        .await;

    let outcome = fixture
        .client()
        .batch_call(vec![
            CallRequest::new("addPerformance").field("views", 10),
            CallRequest::new("getTasks"),
        ])
        .await;

    assert!(outcome.all_succeeded());
    assert_eq!(outcome.entries[0].data, Some(json!({"id": "p1"})));
}

#[tokio::test]
async fn test_empty_batch() {
    let fixture = MockServerFixture::new().await;
    let outcome = fixture.client().batch_call(Vec::new()).await;
    assert!(outcome.is_empty());
    assert!(outcome.all_succeeded());
}
