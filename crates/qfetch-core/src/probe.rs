//! Local state probe: is the file already on disk with the right size?

use std::path::Path;

use crate::size::sizes_match;

/// Default tolerance in bytes. The remote reports sizes in 0.01 MB steps.
pub const DEFAULT_SIZE_TOLERANCE: u64 = 10240;

/// What the probe found at a target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalState {
    Missing,
    /// Present, but the expected size is unknown so it cannot be trusted.
    Unverifiable { actual: u64 },
    Mismatch { actual: u64 },
    Matches,
}

/// Read-only view of local download state.
#[derive(Debug, Clone, Copy)]
pub struct LocalProbe {
    tolerance: u64,
}

impl Default for LocalProbe {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_TOLERANCE)
    }
}

impl LocalProbe {
    pub fn new(tolerance: u64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> u64 {
        self.tolerance
    }

    /// Compare an observed byte count against an expected one.
    pub fn sizes_match(&self, expected: u64, actual: u64) -> bool {
        sizes_match(expected, actual, self.tolerance)
    }

    /// Size of a regular file at `path`, or `None` if it is absent or unreadable.
    pub fn local_size(&self, path: &Path) -> Option<u64> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => Some(meta.len()),
            Ok(_) => None,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), "stat failed: {}", e);
                }
                None
            }
        }
    }

    pub fn state(&self, path: &Path, expected_size: Option<u64>) -> LocalState {
        match (self.local_size(path), expected_size) {
            (None, _) => LocalState::Missing,
            (Some(actual), None) => LocalState::Unverifiable { actual },
            (Some(actual), Some(expected)) if self.sizes_match(expected, actual) => {
                LocalState::Matches
            }
            (Some(actual), Some(_)) => LocalState::Mismatch { actual },
        }
    }

    /// True iff a file exists at `path` and its size is within tolerance of
    /// `expected_size`. An unknown expected size never matches.
    pub fn exists_and_matches(&self, path: &Path, expected_size: Option<u64>) -> bool {
        self.state(path, expected_size) == LocalState::Matches
    }
}
