//! Remote call client.
//!
//! Keep the public surface small: `call`, `call_with_retry` and `batch_call`
//! on [`RemoteCallClient`], plus a builder. Request encoding, response
//! normalization and retry policy live in submodules under `src/client/`.

mod builder;
mod call;
mod core;
mod execution;
mod policy;
mod response;
mod upload;

pub use builder::RemoteCallClientBuilder;
pub use call::{encode_query, CallRequest, Payload};
pub use self::core::RemoteCallClient;
pub use policy::RetryPolicy;
pub use response::UNAUTHORIZED_SENTINEL;
pub use upload::{data_url, guess_mime, UPLOAD_ACTION};
