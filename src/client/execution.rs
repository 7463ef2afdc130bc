//! 单次调用执行：凭证检查、发送、响应归一化与终止失败上报。
//!
//! Single-attempt execution and terminal failure reporting.

use crate::actions::ActionDescriptor;
use crate::events::ClientEvent;
use crate::session::Credential;
use crate::transport::HttpMethod;
use crate::{Error, ErrorContext, ErrorKind, Result};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::call::{build_transport_request, validate_action, CallRequest};
use super::core::RemoteCallClient;
use super::response::normalize;

/// What a call resolved to before the first attempt.
pub(crate) struct Prepared {
    pub(crate) descriptor: ActionDescriptor,
    pub(crate) method: HttpMethod,
    pub(crate) credential: Option<Credential>,
}

impl RemoteCallClient {
    /// Resolve the descriptor and method and read the credential once.
    ///
    /// Fails with `AuthMissing` before any I/O when the action needs a
    /// credential and the session has none.
    pub(crate) fn prepare(&self, request: &CallRequest) -> Result<Prepared> {
        validate_action(&request.action)?;
        let descriptor = self.catalog.resolve(&request.action);
        let method = request.method.unwrap_or(descriptor.method);
        let credential = self.session.credential();

        if descriptor.requires_auth && credential.is_none() {
            return Err(Error::AuthMissing {
                action: request.action.clone(),
            });
        }

        Ok(Prepared {
            descriptor,
            method,
            credential,
        })
    }

    /// One request/response exchange. No retry, no event reporting.
    pub(crate) async fn attempt_once(
        &self,
        request: &CallRequest,
        prepared: &Prepared,
        attempt: u32,
    ) -> Result<Value> {
        let request_id = Uuid::new_v4().to_string();
        let context = ErrorContext::new()
            .with_action(&request.action)
            .with_request_id(&request_id)
            .with_attempt(attempt);

        let wire = build_transport_request(
            &self.endpoint,
            &request.action,
            &request.payload,
            prepared.method,
            prepared.credential.as_ref(),
            self.placement,
            &request_id,
        )?;

        debug!(
            action = %request.action,
            method = %prepared.method,
            attempt,
            request_id = %request_id,
            "studio-rpc dispatching call"
        );

        let start = Instant::now();
        let response = match self.transport.send(wire).await {
            Ok(r) => r,
            Err(source) => {
                info!(
                    action = %request.action,
                    attempt,
                    request_id = %request_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %source,
                    "studio-rpc call failed before a response"
                );
                return Err(Error::Network {
                    action: request.action.clone(),
                    source,
                    context: context.with_source("transport"),
                });
            }
        };

        let http_status = response.status;
        let result = normalize(
            &request.action,
            response,
            context.with_source("response_parser"),
        );
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(
                action = %request.action,
                attempt,
                request_id = %request_id,
                http_status,
                duration_ms,
                "studio-rpc call succeeded"
            ),
            Err(e) => info!(
                action = %request.action,
                attempt,
                request_id = %request_id,
                http_status,
                duration_ms,
                error_kind = %e.kind(),
                "studio-rpc call failed"
            ),
        }
        result
    }

    /// Report a terminal failure and hand it back unchanged.
    ///
    /// A session rejection clears the stored session and emits a
    /// `SessionInvalidated` event ahead of the failure notification.
    pub(crate) async fn finish(&self, action: &str, err: Error) -> Result<Value> {
        if err.kind() == ErrorKind::Unauthorized {
            self.session.clear();
            warn!(action, "studio-rpc session invalidated, credential cleared");
            self.emit(ClientEvent::SessionInvalidated {
                action: action.to_string(),
                redirect_after: self.login_redirect_delay,
            })
            .await;
        }

        self.emit(ClientEvent::Failure {
            action: action.to_string(),
            kind: err.kind(),
            message: err.user_message(),
        })
        .await;
        Err(err)
    }

    async fn emit(&self, event: ClientEvent) {
        if let Err(e) = self.events.report(event).await {
            warn!(error = %e, "studio-rpc event sink rejected event");
        }
    }
}
