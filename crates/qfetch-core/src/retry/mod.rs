//! Retry and backoff for file transfers.
//!
//! Transfer failures are classified (timeouts, throttling, connection
//! failures) and only transient kinds are retried with exponential backoff.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
