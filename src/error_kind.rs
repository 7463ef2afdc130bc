//! 失败分类：定义远程调用的错误种类及其重试语义。
//!
//! Failure taxonomy for remote calls.
//!
//! Every failed call resolves to exactly one [`ErrorKind`]. The kind decides
//! whether the retry loop may try again and whether the user has to act
//! (sign in again) before anything else can succeed.
//!
//! ## Error Kind Categories
//!
//! | Prefix | Category  | Description                                  |
//! |--------|-----------|----------------------------------------------|
//! | E1xxx  | auth      | Credential missing locally or rejected       |
//! | E2xxx  | request   | Rejected before dispatch or by the backend   |
//! | E3xxx  | transient | Transport or HTTP failures, retryable        |
//! | E4xxx  | protocol  | Response did not match the expected shape    |
//! | E9xxx  | local     | Client setup problems                        |
//!
//! ## Example
//!
//! ```rust
//! use studio_rpc::ErrorKind;
//!
//! assert!(ErrorKind::NetworkError.retryable());
//! assert!(!ErrorKind::Unauthorized.retryable());
//! assert_eq!(ErrorKind::HttpError.code(), "E3002");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// E1001: No credential in the session; nothing was sent
    AuthMissing,
    /// E1002: Backend reported the session as expired or invalid
    Unauthorized,
    /// E2001: Request failed local validation (empty action, nested GET payload)
    InvalidRequest,
    /// E2002: Backend processed the request and reported an application failure
    Remote,
    /// E3001: Transport failed before any response arrived
    NetworkError,
    /// E3002: Response arrived with a non-success HTTP status
    HttpError,
    /// E4001: Response body was empty or not the expected JSON shape
    ProtocolError,
    /// E9001: Client could not be configured
    Configuration,
}

impl ErrorKind {
    /// Returns the canonical code string (e.g., `"E3001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthMissing => "E1001",
            Self::Unauthorized => "E1002",
            Self::InvalidRequest => "E2001",
            Self::Remote => "E2002",
            Self::NetworkError => "E3001",
            Self::HttpError => "E3002",
            Self::ProtocolError => "E4001",
            Self::Configuration => "E9001",
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthMissing => "auth_missing",
            Self::Unauthorized => "unauthorized",
            Self::InvalidRequest => "invalid_request",
            Self::Remote => "remote",
            Self::NetworkError => "network_error",
            Self::HttpError => "http_error",
            Self::ProtocolError => "protocol_error",
            Self::Configuration => "configuration",
        }
    }

    /// Transient kinds. Only these are ever retried.
    #[inline]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::HttpError)
    }

    /// Kinds that can only be resolved by signing in again.
    #[inline]
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::AuthMissing | Self::Unauthorized)
    }

    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthMissing | Self::Unauthorized => "auth",
            Self::InvalidRequest | Self::Remote => "request",
            Self::NetworkError | Self::HttpError => "transient",
            Self::ProtocolError => "protocol",
            Self::Configuration => "local",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
