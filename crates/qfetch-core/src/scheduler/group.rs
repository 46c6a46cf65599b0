//! Per-group scheduling: decide fetch / skip / defer for each file.

use std::path::{Path, PathBuf};

use crate::config::QfetchConfig;
use crate::inventory::{FileEntry, Group};
use crate::probe::LocalProbe;
use crate::quota::QuotaLedger;
use crate::transfer::Fetcher;
use crate::url_model::{target_path, FileLayout};

use super::report::{FailureKind, FileFailure, GroupReport};

/// Everything about the local side a pass needs.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Base directory for downloads.
    pub local_root: PathBuf,
    pub layout: FileLayout,
    pub probe: LocalProbe,
    /// Downloads below this many bytes are discarded as error pages.
    pub min_viable_bytes: u64,
}

impl SchedulerSettings {
    pub fn new(local_root: impl Into<PathBuf>) -> Self {
        Self {
            local_root: local_root.into(),
            layout: FileLayout::default(),
            probe: LocalProbe::default(),
            min_viable_bytes: crate::config::DEFAULT_MIN_VIABLE_BYTES,
        }
    }

    pub fn from_config(cfg: &QfetchConfig, local_root: impl Into<PathBuf>) -> Self {
        Self {
            local_root: local_root.into(),
            layout: cfg.layout,
            probe: LocalProbe::new(cfg.size_tolerance_bytes),
            min_viable_bytes: cfg.min_viable_bytes,
        }
    }

    /// Local path for `url` in group `group_id`.
    pub fn target_for(&self, group_id: &str, url: &str) -> Option<PathBuf> {
        target_path(&self.local_root, self.layout, group_id, url)
    }
}

/// Removes a bad artifact; absence is fine.
fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed bad download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "could not remove bad download: {}", e),
    }
}

/// Processes one file; `Err` is the failure to record.
fn schedule_file(
    group_id: &str,
    file: &FileEntry,
    ledger: &mut QuotaLedger,
    settings: &SchedulerSettings,
    fetcher: &dyn Fetcher,
    report: &mut GroupReport,
) -> Result<(), (Option<PathBuf>, FailureKind)> {
    let path = settings
        .target_for(group_id, &file.url)
        .ok_or((None, FailureKind::NoFileName))?;

    if settings.probe.exists_and_matches(&path, file.expected_size) {
        tracing::debug!(url = %file.url, path = %path.display(), "already downloaded, skipping");
        report.skipped += 1;
        return Ok(());
    }

    let expected = file
        .expected_size
        .ok_or_else(|| (Some(path.clone()), FailureKind::UnverifiableSize))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            (
                Some(path.clone()),
                FailureKind::LocalStorage(format!("{}: {}", parent.display(), e)),
            )
        })?;
    }

    let available = ledger.current();
    if !ledger.reserve(expected) {
        return Err((
            Some(path),
            FailureKind::QuotaExhausted {
                required: expected,
                available,
            },
        ));
    }

    tracing::info!(url = %file.url, expected, "downloading");
    let actual = match fetcher.fetch(&file.url, &path) {
        Ok(n) => n,
        Err(e) => {
            remove_artifact(&path);
            return Err((Some(path), FailureKind::TransferFailed(e.to_string())));
        }
    };

    if actual < settings.min_viable_bytes {
        remove_artifact(&path);
        return Err((
            Some(path),
            FailureKind::TransferTooSmall {
                actual,
                minimum: settings.min_viable_bytes,
            },
        ));
    }
    if !settings.probe.sizes_match(expected, actual) {
        // Kept: the next pass re-probes it and retries on mismatch.
        return Err((Some(path), FailureKind::SizeMismatch { expected, actual }));
    }

    tracing::info!(url = %file.url, actual, "download complete");
    report.fetched += 1;
    Ok(())
}

/// Schedules every file of `group` in listing order.
///
/// Files already present with a matching size are skipped without touching
/// the ledger. Everything else is reserved against `ledger` and fetched. A
/// failure on one file never stops the rest of the group, but any failure
/// makes the group Incomplete.
pub fn schedule_group(
    group: &Group,
    ledger: &mut QuotaLedger,
    settings: &SchedulerSettings,
    fetcher: &dyn Fetcher,
) -> GroupReport {
    let mut report = GroupReport::new(group.key.clone());
    tracing::debug!(
        group_id = %group.key.id,
        name = %group.key.name,
        files = group.files.len(),
        "scheduling group"
    );

    for file in &group.files {
        if let Err((path, kind)) =
            schedule_file(&group.key.id, file, ledger, settings, fetcher, &mut report)
        {
            tracing::warn!(
                group_id = %group.key.id,
                url = %file.url,
                kind = kind.label(),
                "{}",
                kind
            );
            report.failures.push(FileFailure {
                url: file.url.clone(),
                path,
                kind,
            });
        }
    }

    report
}
