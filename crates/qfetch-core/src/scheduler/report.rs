//! Per-file failures and per-group / per-pass outcomes.

use std::fmt;
use std::path::PathBuf;

use crate::inventory::GroupKey;

/// Why a file did not count toward its group's completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Expected size unknown; the download could never be verified.
    UnverifiableSize,
    /// Not enough transfer left in this pass.
    QuotaExhausted { required: u64, available: u64 },
    /// URL has no usable final path segment to name the local file.
    NoFileName,
    /// Local directory could not be prepared.
    LocalStorage(String),
    /// The transfer itself failed (network, HTTP status, downloader exit).
    TransferFailed(String),
    /// Download was below the minimum viable size; treated as an error page and removed.
    TransferTooSmall { actual: u64, minimum: u64 },
    /// Download landed but its size is off by more than the tolerance; kept on disk.
    SizeMismatch { expected: u64, actual: u64 },
}

impl FailureKind {
    /// Stable label for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::UnverifiableSize => "unverifiable_size",
            FailureKind::QuotaExhausted { .. } => "quota_exhausted",
            FailureKind::NoFileName => "no_file_name",
            FailureKind::LocalStorage(_) => "local_storage",
            FailureKind::TransferFailed(_) => "transfer_failed",
            FailureKind::TransferTooSmall { .. } => "transfer_too_small",
            FailureKind::SizeMismatch { .. } => "size_mismatch",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::UnverifiableSize => write!(f, "expected size unknown"),
            FailureKind::QuotaExhausted {
                required,
                available,
            } => write!(
                f,
                "not enough available transfer: required={required}, available={available}"
            ),
            FailureKind::NoFileName => write!(f, "no file name in URL"),
            FailureKind::LocalStorage(e) => write!(f, "local storage: {e}"),
            FailureKind::TransferFailed(e) => write!(f, "transfer failed: {e}"),
            FailureKind::TransferTooSmall { actual, minimum } => write!(
                f,
                "download too small ({actual} < {minimum} bytes), removed"
            ),
            FailureKind::SizeMismatch { expected, actual } => {
                write!(f, "mismatch in size: expected={expected}, actual={actual}")
            }
        }
    }
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub url: String,
    pub path: Option<PathBuf>,
    pub kind: FailureKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Every file verified locally; safe to delete remotely.
    Complete,
    Incomplete,
}

/// Result of scheduling one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub key: GroupKey,
    /// Files downloaded and verified in this pass.
    pub fetched: usize,
    /// Files already present with a matching size.
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
}

impl GroupReport {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            fetched: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn outcome(&self) -> GroupOutcome {
        if self.failures.is_empty() {
            GroupOutcome::Complete
        } else {
            GroupOutcome::Incomplete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome() == GroupOutcome::Complete
    }
}

/// Result of one refresh-and-schedule pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub quota_at_start: u64,
    pub quota_remaining: u64,
    pub groups: Vec<GroupReport>,
    /// Groups excluded by the filter.
    pub filtered: usize,
    /// Identifiers of groups deleted remotely.
    pub deleted: Vec<String>,
    /// `(group id, error)` for deletions that failed.
    pub delete_failures: Vec<(String, String)>,
}

impl PassReport {
    pub fn complete_count(&self) -> usize {
        self.groups.iter().filter(|g| g.is_complete()).count()
    }

    pub fn incomplete_count(&self) -> usize {
        self.groups.len() - self.complete_count()
    }

    pub fn fetched_count(&self) -> usize {
        self.groups.iter().map(|g| g.fetched).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.groups.iter().map(|g| g.failures.len()).sum::<usize>() + self.delete_failures.len()
    }
}
