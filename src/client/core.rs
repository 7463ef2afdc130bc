use crate::actions::{ActionCatalog, ActionDescriptor};
use crate::batch::{BatchEntry, BatchExecutor, BatchOptions, BatchOutcome};
use crate::config::{ClientConfig, CredentialPlacement};
use crate::events::EventSink;
use crate::session::SessionStore;
use crate::transport::{HttpMethod, Transport};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

use super::builder::RemoteCallClientBuilder;
use super::call::CallRequest;
use super::policy::{Decision, RetryPolicy};

/// Client for a single remote endpoint that dispatches named actions.
///
/// Cheap to clone; every clone shares the transport, session and event sink.
#[derive(Clone)]
pub struct RemoteCallClient {
    pub(crate) endpoint: Url,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) session: Arc<dyn SessionStore>,
    pub(crate) events: Arc<dyn EventSink>,
    pub(crate) catalog: Arc<ActionCatalog>,
    pub(crate) placement: CredentialPlacement,
    pub(crate) retry: RetryPolicy,
    pub(crate) batch_concurrency: Option<usize>,
    pub(crate) login_redirect_delay: Duration,
}

impl RemoteCallClient {
    pub fn builder() -> RemoteCallClientBuilder {
        RemoteCallClientBuilder::new()
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        RemoteCallClientBuilder::from_config(config).build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn credential_placement(&self) -> CredentialPlacement {
        self.placement
    }

    pub fn descriptor(&self, action: &str) -> ActionDescriptor {
        self.catalog.resolve(action)
    }

    /// HTTP method used for `action` when the caller does not pick one.
    pub fn derive_method(&self, action: &str) -> HttpMethod {
        self.descriptor(action).method
    }

    /// Perform one call. No retry.
    ///
    /// `payload` must be a JSON object or `null`. When `method` is `None` it
    /// is derived from the action name.
    pub async fn call(
        &self,
        action: &str,
        payload: Value,
        method: Option<HttpMethod>,
    ) -> Result<Value> {
        let mut request = match CallRequest::with_json(action, payload) {
            Ok(r) => r,
            Err(e) => return self.finish(action, e).await,
        };
        request.method = method;
        self.execute(request, 1).await
    }

    /// Perform a call, retrying transient failures with exponential backoff.
    ///
    /// At most `max_attempts` attempts are made (values below 1 count as 1).
    /// Session and request errors are returned after the first attempt.
    pub async fn call_with_retry(
        &self,
        action: &str,
        payload: Value,
        max_attempts: u32,
    ) -> Result<Value> {
        match CallRequest::with_json(action, payload) {
            Ok(request) => self.execute(request, max_attempts).await,
            Err(e) => self.finish(action, e).await,
        }
    }

    /// Same as [`call_with_retry`](Self::call_with_retry) with the configured
    /// attempt bound.
    pub async fn call_resilient(&self, action: &str, payload: Value) -> Result<Value> {
        self.call_with_retry(action, payload, self.retry.max_attempts)
            .await
    }

    /// Run a prepared request with up to `max_attempts` attempts.
    ///
    /// Exactly one failure event is reported when the call finally fails.
    pub async fn execute(&self, request: CallRequest, max_attempts: u32) -> Result<Value> {
        let prepared = match self.prepare(&request) {
            Ok(p) => p,
            Err(e) => return self.finish(&request.action, e).await,
        };
        let max_attempts = max_attempts.max(1);

        let mut attempt: u32 = 0;
        loop {
            match self.attempt_once(&request, &prepared, attempt).await {
                Ok(data) => {
                    if attempt > 0 {
                        info!(
                            action = %request.action,
                            attempts = attempt + 1,
                            "studio-rpc call recovered after retry"
                        );
                    }
                    return Ok(data);
                }
                Err(err) => {
                    match self
                        .retry
                        .decide(&err, &prepared.descriptor, attempt, max_attempts)
                    {
                        Decision::Retry { delay } => {
                            warn!(
                                action = %request.action,
                                attempt,
                                max_attempts,
                                delay_ms = delay.as_millis() as u64,
                                error = %err,
                                "studio-rpc transient failure, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        Decision::Fail => return self.finish(&request.action, err).await,
                    }
                }
            }
        }
    }

    /// Run several calls concurrently with the configured concurrency cap.
    ///
    /// The outcome has one entry per request, in request order. A failing
    /// entry never aborts the others.
    pub async fn batch_call(&self, requests: Vec<CallRequest>) -> BatchOutcome {
        let options = BatchOptions {
            concurrency_limit: self.batch_concurrency,
            ..BatchOptions::default()
        };
        self.batch_call_with(requests, options).await
    }

    pub async fn batch_call_with(
        &self,
        requests: Vec<CallRequest>,
        options: BatchOptions,
    ) -> BatchOutcome {
        let start = Instant::now();
        let total = requests.len();
        let max_attempts = options.max_attempts;

        let entries = BatchExecutor::new()
            .with_concurrency_limit(options.concurrency_limit)
            .run(requests, |request| async move {
                let action = request.action.clone();
                let result = self.execute(request, max_attempts).await;
                BatchEntry::from_result(action, result)
            })
            .await;

        let outcome = BatchOutcome::new(entries, start.elapsed());
        info!(
            total,
            succeeded = outcome.success_count(),
            failed = outcome.failure_count(),
            duration_ms = outcome.execution_time.as_millis() as u64,
            "studio-rpc batch finished"
        );
        outcome
    }
}

impl std::fmt::Debug for RemoteCallClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCallClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("placement", &self.placement)
            .field("retry", &self.retry)
            .field("actions", &self.catalog.len())
            .finish()
    }
}
