//! 客户端事件：失败通知与会话失效信号。
//!
//! Client events.
//!
//! The client does not render anything. Terminal failures and session
//! invalidation are reported to an [`EventSink`] and the UI layer decides how
//! to show them.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ClientEvent`] | Failure notification or session invalidation |
//! | [`EventSink`] | Trait for event destinations |
//! | [`NoopEventSink`] | Default sink, drops everything |
//! | [`InMemoryEventSink`] | Collects events, for tests |
//! | [`TracingEventSink`] | Logs events through `tracing` |
//! | [`ChannelEventSink`] | Forwards events to a tokio channel for a UI loop |

use crate::error_kind::ErrorKind;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// One per terminal failure of a call, never per retry attempt.
    Failure {
        action: String,
        kind: ErrorKind,
        message: String,
    },
    /// Session was cleared; route to sign-in once `redirect_after` has elapsed.
    SessionInvalidated {
        action: String,
        redirect_after: Duration,
    },
}

impl ClientEvent {
    pub fn action(&self) -> &str {
        match self {
            ClientEvent::Failure { action, .. } | ClientEvent::SessionInvalidated { action, .. } => {
                action
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn report(&self, event: ClientEvent) -> Result<()>;
}

pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn report(&self, _: ClientEvent) -> Result<()> {
        Ok(())
    }
}

pub fn noop_sink() -> Arc<dyn EventSink> {
    Arc::new(NoopEventSink)
}

/// In-memory sink for testing.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: RwLock<Vec<ClientEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ClientEvent> {
        self.events
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn failures(&self) -> Vec<ClientEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, ClientEvent::Failure { .. }))
            .collect()
    }

    pub fn invalidations(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ClientEvent::SessionInvalidated { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn report(&self, event: ClientEvent) -> Result<()> {
        self.events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
        Ok(())
    }
}

/// Logs events; useful for headless callers such as the CLI.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn report(&self, event: ClientEvent) -> Result<()> {
        match &event {
            ClientEvent::Failure {
                action,
                kind,
                message,
            } => info!(
                action = action.as_str(),
                kind = kind.name(),
                code = kind.code(),
                "{message}"
            ),
            ClientEvent::SessionInvalidated {
                action,
                redirect_after,
            } => warn!(
                action = action.as_str(),
                redirect_after_ms = redirect_after.as_millis() as u64,
                "session invalidated, sign in again"
            ),
        }
        Ok(())
    }
}

/// Forwards events to an unbounded tokio channel.
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn report(&self, event: ClientEvent) -> Result<()> {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped; discarding client event");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(action: &str) -> ClientEvent {
        ClientEvent::Failure {
            action: action.into(),
            kind: ErrorKind::HttpError,
            message: "The server returned an error (HTTP 500).".into(),
        }
    }

    #[tokio::test]
    async fn in_memory_sink_separates_event_types() {
        let sink = InMemoryEventSink::new();
        sink.report(failure("getTasks")).await.unwrap();
        sink.report(ClientEvent::SessionInvalidated {
            action: "createTask".into(),
            redirect_after: Duration::from_secs(2),
        })
        .await
        .unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.failures().len(), 1);
        assert_eq!(sink.invalidations(), 1);
        assert_eq!(sink.events()[1].action(), "createTask");
    }

    #[tokio::test]
    async fn channel_sink_forwards_and_tolerates_closed_receiver() {
        let (sink, mut rx) = ChannelEventSink::new();
        sink.report(failure("getScripts")).await.unwrap();
        assert_eq!(rx.recv().await, Some(failure("getScripts")));

        drop(rx);
        assert!(sink.report(failure("getScripts")).await.is_ok());
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let v = serde_json::to_value(failure("getTasks")).unwrap();
        assert_eq!(v["type"], "failure");
        assert_eq!(v["kind"], "http_error");
    }
}
