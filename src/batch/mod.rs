//! 批量调用模块：并发执行多个远程调用并按原顺序汇总结果。
//!
//! # Batch Calls
//!
//! Runs several independent remote calls concurrently and collects one
//! entry per call, in the order the calls were given. A failing call never
//! aborts the others.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchExecutor`] | Order-preserving concurrent runner with an optional cap |
//! | [`BatchOptions`] | Concurrency cap and per-call attempt bound |
//! | [`BatchEntry`] | Success flag plus data or failure for one call |
//! | [`BatchOutcome`] | All entries plus counters and elapsed time |
//!
//! ## Example
//!
//! ```rust,no_run
//! use studio_rpc::{CallRequest, RemoteCallClient};
//!
//! # async fn run(client: RemoteCallClient) {
//! let outcome = client
//!     .batch_call(vec![
//!         CallRequest::new("getTasks"),
//!         CallRequest::new("getScripts").field("status", "draft"),
//!     ])
//!     .await;
//! for entry in &outcome {
//!     println!("{} -> {}", entry.action, entry.succeeded);
//! }
//! # }
//! ```

mod executor;
mod outcome;

pub use executor::BatchExecutor;
pub use outcome::{BatchEntry, BatchOptions, BatchOutcome};
