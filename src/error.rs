use crate::error_kind::ErrorKind;
use crate::transport::TransportError;
use serde::Serialize;
use thiserror::Error;

/// Structured error context for logging and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Remote action the failing call was dispatched for
    pub action: Option<String>,
    /// Client-generated correlation id (`x-studio-request-id`)
    pub request_id: Option<String>,
    /// 0-based attempt that produced the error
    pub attempt: Option<u32>,
    /// Field path or configuration key that caused the error (e.g., "payload.title", "retry.max_attempts")
    pub field_path: Option<String>,
    /// Source of the error (e.g., "request_builder", "response_parser")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for remote calls.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Not signed in: no credential available for action '{action}'")]
    AuthMissing { action: String },

    #[error("Session rejected by backend for action '{action}'")]
    Unauthorized { action: String, context: ErrorContext },

    #[error("Network error for action '{action}': {source}")]
    Network {
        action: String,
        #[source]
        source: TransportError,
        context: ErrorContext,
    },

    #[error("HTTP {status} for action '{action}'")]
    Http {
        action: String,
        status: u16,
        body: String,
        context: ErrorContext,
    },

    #[error("Malformed response for action '{action}': {message}")]
    Protocol {
        action: String,
        message: String,
        context: ErrorContext,
    },

    #[error("Backend reported failure for action '{action}': {message}")]
    Remote {
        action: String,
        message: String,
        context: ErrorContext,
    },

    #[error("Invalid request: {message}{}", format_context(.context))]
    InvalidRequest {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref action) = ctx.action {
        parts.push(format!("action: {}", action));
    }
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn invalid_request(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidRequest {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AuthMissing { .. } => ErrorKind::AuthMissing,
            Error::Unauthorized { .. } => ErrorKind::Unauthorized,
            Error::Network { .. } => ErrorKind::NetworkError,
            Error::Http { .. } => ErrorKind::HttpError,
            Error::Protocol { .. } => ErrorKind::ProtocolError,
            Error::Remote { .. } => ErrorKind::Remote,
            Error::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Error::Configuration { .. } | Error::Io(_) => ErrorKind::Configuration,
        }
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Unauthorized { context, .. }
            | Error::Network { context, .. }
            | Error::Http { context, .. }
            | Error::Protocol { context, .. }
            | Error::Remote { context, .. }
            | Error::InvalidRequest { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            Error::AuthMissing { .. } | Error::Io(_) => None,
        }
    }

    /// Text suitable for a one-line user notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::AuthMissing { .. } => "You are not signed in. Please sign in to continue.".into(),
            Error::Unauthorized { .. } => {
                "Your session has expired. You will be redirected to sign in.".into()
            }
            Error::Network { .. } => {
                "Could not reach the server. Check your connection and try again.".into()
            }
            Error::Http { status, .. } => format!("The server returned an error (HTTP {}).", status),
            Error::Protocol { .. } => "The server sent a response that could not be read.".into(),
            Error::Remote { message, .. } => message.clone(),
            Error::InvalidRequest { message, .. } => message.clone(),
            Error::Configuration { .. } | Error::Io(_) => self.to_string(),
        }
    }
}

/// Serializable summary of a failed call, as surfaced to UI layers and batch outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            status: err.status(),
        }
    }
}
