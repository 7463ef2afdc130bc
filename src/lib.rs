//! # studio-rpc
//!
//! 面向制作看板后端的弹性远程调用客户端：按动作名复用单一端点，支持鉴权、重试与批量调用。
//!
//! Resilient remote-call client for the studio dashboard backend. Every
//! operation is a named action multiplexed over a single HTTP(S) endpoint.
//!
//! ## Overview
//!
//! - **Method derivation**: GET for reads, POST for mutations, driven by an
//!   [`ActionCatalog`] rather than scattered conditionals
//! - **Credentials**: an injected [`SessionStore`] supplies the session
//!   credential; the backend's `"unauthorized"` sentinel clears it
//! - **Retry**: transient failures (network, HTTP status) back off
//!   exponentially; auth and request errors never retry
//! - **Batching**: concurrent calls with per-entry outcomes in request order
//! - **Events**: terminal failures and session invalidation go to an
//!   [`EventSink`], never to a UI directly
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use studio_rpc::{MemorySession, RemoteCallClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> studio_rpc::Result<()> {
//!     let client = RemoteCallClient::builder()
//!         .endpoint("https://script.example.com/macros/s/abc/exec")
//!         .session(Arc::new(MemorySession::signed_in("token", None)))
//!         .build()?;
//!
//!     let tasks = client.call_resilient("getTasks", json!({"status": "open"})).await?;
//!     println!("{tasks}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder, request encoding, retry policy |
//! | [`actions`] | Action descriptors and the default catalog |
//! | [`session`] | Credential, user profile, session stores |
//! | [`transport`] | Transport trait and the reqwest implementation |
//! | [`batch`] | Order-preserving concurrent batch execution |
//! | [`events`] | Failure and session-invalidation events |
//! | [`config`] | YAML configuration with environment overrides |
//! | [`csv`] | CSV import into batch requests |

pub mod actions;
pub mod batch;
pub mod client;
pub mod config;
pub mod csv;
pub mod error_kind;
pub mod events;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use actions::{ActionCatalog, ActionDescriptor};
pub use batch::{BatchEntry, BatchOptions, BatchOutcome};
pub use client::{CallRequest, Payload, RemoteCallClient, RemoteCallClientBuilder, RetryPolicy};
pub use config::{ClientConfig, CredentialPlacement, RetryConfig};
pub use error_kind::ErrorKind;
pub use events::{ClientEvent, EventSink};
pub use session::{
    Credential, CredentialVault, MemorySession, PersistedSession, Role, SessionStore, UserProfile,
};
pub use transport::{HttpMethod, Transport};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, Failure};
