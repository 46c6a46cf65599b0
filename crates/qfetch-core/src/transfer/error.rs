//! Transfer error type, classified for retry before reaching the scheduler.

use thiserror::Error;

/// Failure of a single file transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Local file could not be created, written or inspected.
    #[error("storage: {0}")]
    Io(#[from] std::io::Error),
    /// External downloader failed to start or exited unsuccessfully.
    #[error("{program}: {status}")]
    Command { program: String, status: String },
}
