//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;
use studio_rpc::events::InMemoryEventSink;
use studio_rpc::{
    CredentialPlacement, MemorySession, RemoteCallClient, RemoteCallClientBuilder, RetryPolicy,
};

pub const TOKEN: &str = "tok-123";

/// Test fixture that owns a mock server plus the session and event sink
/// handed to the client under test.
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub endpoint: String,
    pub session: Arc<MemorySession>,
    pub events: Arc<InMemoryEventSink>,
}

impl MockServerFixture {
    /// Fixture with a signed-in session.
    pub async fn new() -> Self {
        Self::with_session(MemorySession::signed_in(TOKEN, None)).await
    }

    /// Fixture with no credential stored.
    pub async fn signed_out() -> Self {
        Self::with_session(MemorySession::new()).await
    }

    async fn with_session(session: MemorySession) -> Self {
        let server = Server::new_async().await;
        let endpoint = format!("{}/exec", server.url());
        Self {
            server,
            endpoint,
            session: Arc::new(session),
            events: Arc::new(InMemoryEventSink::new()),
        }
    }

    /// Builder wired to this fixture, with millisecond backoff so retry
    /// tests run in real time.
    pub fn builder(&self) -> RemoteCallClientBuilder {
        RemoteCallClient::builder()
            .endpoint(self.endpoint.clone())
            .session(self.session.clone())
            .event_sink(self.events.clone())
            .retry_policy(RetryPolicy::new(3, Duration::from_millis(1)))
    }

    pub fn client(&self) -> RemoteCallClient {
        self.builder().build().unwrap()
    }

    pub fn embedded_client(&self) -> RemoteCallClient {
        self.builder()
            .credential_placement(CredentialPlacement::Embedded)
            .build()
            .unwrap()
    }

    /// GET for `action` answering with a JSON body.
    pub async fn mock_get(&mut self, action: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("GET", "/exec")
            .match_query(Matcher::UrlEncoded("action".into(), action.into()))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// POST for `action` answering with a JSON body.
    pub async fn mock_post(&mut self, action: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", "/exec")
            .match_query(Matcher::UrlEncoded("action".into(), action.into()))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}
