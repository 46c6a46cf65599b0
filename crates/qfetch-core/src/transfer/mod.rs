//! File transfer backends.
//!
//! The scheduler only needs "fetch this URL to this path and tell me how many
//! bytes landed". Two backends exist: libcurl in-process ([`CurlFetcher`]) or
//! an external downloader command ([`CommandFetcher`]). Either is wrapped in
//! a [`RetryingFetcher`] so transient network failures are retried.

mod command;
mod error;
mod http;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::QfetchConfig;
use crate::retry::{run_with_retry, RetryPolicy};

pub use self::command::{CommandFetcher, DEFAULT_COMMAND};
pub use self::error::TransferError;
pub use self::http::CurlFetcher;

/// Retrieves one remote file to a local path.
pub trait Fetcher: Send + Sync {
    /// Downloads `url` into `dest`, overwriting any existing file, and
    /// returns the size of `dest` afterwards.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError>;
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        (**self).fetch(url, dest)
    }
}

/// Transfer backend: libcurl in-process, or an external downloader command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferBackend {
    #[default]
    Curl,
    Command,
}

/// Retries the inner fetcher on transient failures.
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        run_with_retry(&self.policy, || self.inner.fetch(url, dest))
    }
}

/// Builds the configured backend, wrapped with the configured retry policy.
pub fn fetcher_from_config(cfg: &QfetchConfig) -> Box<dyn Fetcher> {
    let policy = cfg
        .retry
        .as_ref()
        .map(RetryPolicy::from)
        .unwrap_or_default();
    match cfg.transfer_backend {
        TransferBackend::Curl => {
            let curl = CurlFetcher {
                max_recv_speed: cfg.max_bytes_per_sec,
                ..CurlFetcher::default()
            };
            Box::new(RetryingFetcher::new(curl, policy))
        }
        TransferBackend::Command => {
            let command = cfg
                .downloader_command
                .clone()
                .map(CommandFetcher::new)
                .unwrap_or_default();
            Box::new(RetryingFetcher::new(command, policy))
        }
    }
}
