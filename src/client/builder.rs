use crate::actions::{ActionCatalog, ActionDescriptor};
use crate::client::core::RemoteCallClient;
use crate::client::policy::RetryPolicy;
use crate::config::{ClientConfig, CredentialPlacement};
use crate::events::EventSink;
use crate::session::{MemorySession, SessionStore};
use crate::transport::{HttpTransport, HttpTransportConfig, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Builder for [`RemoteCallClient`].
///
/// Only the endpoint is required. Without an explicit session the client gets
/// an empty [`MemorySession`]; without an explicit transport it builds an
/// [`HttpTransport`] from the timeout and proxy settings.
pub struct RemoteCallClientBuilder {
    endpoint: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    session: Option<Arc<dyn SessionStore>>,
    events: Arc<dyn EventSink>,
    catalog: ActionCatalog,
    placement: CredentialPlacement,
    retry: RetryPolicy,
    batch_concurrency: Option<usize>,
    login_redirect_delay: Duration,
    transport_config: HttpTransportConfig,
}

impl RemoteCallClientBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            transport: None,
            session: None,
            events: crate::events::noop_sink(),
            catalog: ActionCatalog::dashboard_default(),
            placement: CredentialPlacement::default(),
            retry: RetryPolicy::default(),
            batch_concurrency: None,
            login_redirect_delay: Duration::from_secs(2),
            transport_config: HttpTransportConfig::default(),
        }
    }

    /// Seed every setting from a loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut catalog = ActionCatalog::dashboard_default();
        catalog.extend(config.actions.clone());
        Self {
            endpoint: Some(config.endpoint.clone()),
            catalog,
            placement: config.credential_placement,
            retry: RetryPolicy::from(&config.retry),
            batch_concurrency: config.batch_concurrency,
            login_redirect_delay: config.login_redirect_delay(),
            transport_config: HttpTransportConfig {
                timeout: config.timeout(),
                proxy_url: config.proxy_url.clone(),
                ..HttpTransportConfig::default()
            },
            ..Self::new()
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Inject a transport (mock servers, custom stacks).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn session(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Inject an event sink. Default is a no-op sink.
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Replace the whole action catalog.
    pub fn catalog(mut self, catalog: ActionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Add or override a single action descriptor.
    pub fn action(mut self, name: impl Into<String>, descriptor: ActionDescriptor) -> Self {
        self.catalog.insert(name, descriptor);
        self
    }

    pub fn credential_placement(mut self, placement: CredentialPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Cap on in-flight calls for `batch_call`. Unlimited when unset.
    pub fn batch_concurrency(mut self, n: usize) -> Self {
        self.batch_concurrency = Some(n.max(1));
        self
    }

    pub fn login_redirect_delay(mut self, delay: Duration) -> Self {
        self.login_redirect_delay = delay;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport_config.timeout = timeout;
        self
    }

    pub fn proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.transport_config.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn build(self) -> Result<RemoteCallClient> {
        let raw = self.endpoint.ok_or_else(|| {
            Error::configuration(
                "endpoint is required",
                ErrorContext::new()
                    .with_field_path("endpoint")
                    .with_source("client_builder"),
            )
        })?;
        let endpoint = parse_endpoint(&raw)?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&self.transport_config)?),
        };
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(MemorySession::new()));

        Ok(RemoteCallClient {
            endpoint,
            transport,
            session,
            events: self.events,
            catalog: Arc::new(self.catalog),
            placement: self.placement,
            retry: self.retry,
            batch_concurrency: self.batch_concurrency,
            login_redirect_delay: self.login_redirect_delay,
        })
    }
}

impl Default for RemoteCallClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let ctx = || {
        ErrorContext::new()
            .with_field_path("endpoint")
            .with_source("client_builder")
    };
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::configuration(format!("invalid endpoint '{raw}': {e}"), ctx()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::configuration(
            format!("endpoint scheme must be http or https, got '{other}'"),
            ctx(),
        )),
    }
}
