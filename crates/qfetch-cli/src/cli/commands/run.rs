//! `qfetch run` – run the download service (one pass, or repeatedly).

use anyhow::Result;
use qfetch_core::config::QfetchConfig;
use qfetch_core::control::{self, StopSignal};
use qfetch_core::scheduler::{GroupFilter, PassReport, SchedulerSettings};
use qfetch_core::service::ServiceLoop;
use qfetch_core::size::format_size;
use qfetch_core::transfer::{self, Fetcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::control_socket;
use crate::cli::AccountArgs;

/// First Ctrl-C stops after the current pass; a second one exits immediately.
fn spawn_interrupt_handler(stop: StopSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::info!("interrupt received; stopping after the current pass");
        eprintln!("Stopping after the current pass (Ctrl-C again to abort).");
        stop.request_stop();
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("second interrupt; aborting");
            std::process::exit(130);
        }
    });
}

fn print_report(report: &PassReport) {
    println!(
        "Quota {} -> {} | groups: {} complete, {} incomplete, {} filtered | {} file(s) fetched",
        format_size(report.quota_at_start),
        format_size(report.quota_remaining),
        report.complete_count(),
        report.incomplete_count(),
        report.filtered,
        report.fetched_count(),
    );
    for group in report.groups.iter().filter(|g| !g.is_complete()) {
        println!("  {}:", group.key);
        for failure in &group.failures {
            println!("    [{}] {}: {}", failure.kind.label(), failure.url, failure.kind);
        }
    }
    for (id, err) in &report.delete_failures {
        println!("  [remote_delete_failure] group {id}: {err}");
    }
}

pub async fn run_service(
    cfg: &QfetchConfig,
    account: &AccountArgs,
    root: &Path,
    filter: Option<String>,
    interval: Option<Duration>,
) -> Result<()> {
    let client = account.client(cfg)?;
    std::fs::create_dir_all(root)?;

    let fetcher: Arc<dyn Fetcher> = Arc::from(transfer::fetcher_from_config(cfg));
    let settings = SchedulerSettings::from_config(cfg, root);
    tracing::info!(root = %root.display(), filter = ?filter, "starting");

    let service = ServiceLoop::new(
        Arc::new(client),
        fetcher,
        settings,
        GroupFilter::from_substring(filter),
    )
    .with_interval(interval);

    let stop = service.stop_signal();
    spawn_interrupt_handler(stop.clone());
    if interval.is_some() {
        match control::default_control_socket_path() {
            Ok(path) => {
                if control_socket::spawn_control_listener(stop.clone(), &path).is_ok() {
                    tracing::debug!(path = %path.display(), "control socket listening");
                }
            }
            Err(e) => tracing::debug!("no control socket path: {}", e),
        }
    }

    let summary = service.run().await?;
    match &summary.last_report {
        Some(report) => print_report(report),
        None => println!("No pass completed."),
    }
    if summary.failed_passes > 0 {
        println!(
            "{} of {} pass(es) failed; see the log for details.",
            summary.failed_passes, summary.passes
        );
    }
    Ok(())
}
