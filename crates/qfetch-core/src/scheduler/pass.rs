//! One pass: refresh inventory, schedule every admitted group, delete the
//! complete ones remotely.

use anyhow::{Context, Result};

use crate::inventory::Inventory;
use crate::quota::QuotaLedger;
use crate::remote::RemoteAccount;
use crate::transfer::Fetcher;

use super::filter::GroupFilter;
use super::group::{schedule_group, SchedulerSettings};
use super::report::PassReport;

/// Runs a single pass. Only a failure to obtain the snapshot escapes; every
/// per-file and per-deletion failure is recorded in the returned report.
pub fn run_pass(
    remote: &dyn RemoteAccount,
    fetcher: &dyn Fetcher,
    settings: &SchedulerSettings,
    filter: &GroupFilter,
) -> Result<PassReport> {
    let snapshot = remote
        .fetch_snapshot()
        .context("refresh account inventory")?;
    let inventory = Inventory::build(snapshot);
    tracing::info!(
        quota = inventory.quota,
        groups = inventory.group_count(),
        files = inventory.file_count(),
        "inventory refreshed"
    );

    let mut ledger = QuotaLedger::new(inventory.quota);
    let mut report = PassReport {
        quota_at_start: inventory.quota,
        ..PassReport::default()
    };

    for group in inventory.groups.values() {
        if !filter.admits(&group.key.name) {
            tracing::debug!(group_id = %group.key.id, name = %group.key.name, "filtered out");
            report.filtered += 1;
            continue;
        }

        let group_report = schedule_group(group, &mut ledger, settings, fetcher);
        if group_report.is_complete() && group.files.is_empty() {
            tracing::warn!(
                group_id = %group.key.id,
                name = %group.key.name,
                "group lists no usable files; deleting it as complete"
            );
        }
        if group_report.is_complete() {
            tracing::debug!(group_id = %group.key.id, "removing group");
            match remote.delete_group(&group.key.id) {
                Ok(()) => {
                    tracing::info!(
                        group_id = %group.key.id,
                        name = %group.key.name,
                        "group complete, deleted remotely"
                    );
                    report.deleted.push(group.key.id.clone());
                }
                Err(e) => {
                    tracing::warn!(
                        group_id = %group.key.id,
                        kind = "remote_delete_failure",
                        "could not delete group: {:#}",
                        e
                    );
                    report
                        .delete_failures
                        .push((group.key.id.clone(), format!("{e:#}")));
                }
            }
        } else {
            tracing::info!(
                group_id = %group.key.id,
                name = %group.key.name,
                failures = group_report.failures.len(),
                "group incomplete, kept for a later pass"
            );
        }
        report.groups.push(group_report);
    }

    report.quota_remaining = ledger.current();
    tracing::info!(
        complete = report.complete_count(),
        incomplete = report.incomplete_count(),
        filtered = report.filtered,
        fetched = report.fetched_count(),
        quota_remaining = report.quota_remaining,
        "pass finished"
    );
    Ok(report)
}
