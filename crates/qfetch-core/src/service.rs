//! Long-running service loop: refresh, schedule, sleep, repeat.
//!
//! Each pass runs on the blocking pool since transfers and the account
//! session are blocking libcurl calls. With a repeat interval, a failed or
//! panicking pass is logged and the loop carries on; without one, the single
//! pass's error is returned to the caller.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::control::StopSignal;
use crate::remote::RemoteAccount;
use crate::scheduler::{run_pass, GroupFilter, PassReport, SchedulerSettings};
use crate::transfer::Fetcher;

/// What the loop did before it stopped.
#[derive(Debug, Clone, Default)]
pub struct ServiceSummary {
    pub passes: u32,
    pub failed_passes: u32,
    pub last_report: Option<PassReport>,
}

pub struct ServiceLoop {
    remote: Arc<dyn RemoteAccount>,
    fetcher: Arc<dyn Fetcher>,
    settings: Arc<SchedulerSettings>,
    filter: Arc<GroupFilter>,
    interval: Option<Duration>,
    stop: StopSignal,
}

impl ServiceLoop {
    /// A one-shot loop; see [`ServiceLoop::with_interval`].
    pub fn new(
        remote: Arc<dyn RemoteAccount>,
        fetcher: Arc<dyn Fetcher>,
        settings: SchedulerSettings,
        filter: GroupFilter,
    ) -> Self {
        Self {
            remote,
            fetcher,
            settings: Arc::new(settings),
            filter: Arc::new(filter),
            interval: None,
            stop: StopSignal::new(),
        }
    }

    /// Repeat passes every `interval`; `None` runs exactly one pass.
    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Handle to request a stop from elsewhere (signal handler, control socket).
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    async fn run_one_pass(&self) -> Result<PassReport> {
        let remote = Arc::clone(&self.remote);
        let fetcher = Arc::clone(&self.fetcher);
        let settings = Arc::clone(&self.settings);
        let filter = Arc::clone(&self.filter);
        tokio::task::spawn_blocking(move || run_pass(&*remote, &*fetcher, &settings, &filter))
            .await
            .map_err(|e| anyhow!("pass aborted: {e}"))?
    }

    /// Runs until one-shot completion or a stop request. Stop is observed
    /// between passes only.
    pub async fn run(&self) -> Result<ServiceSummary> {
        match self.interval {
            Some(i) => tracing::info!(interval_secs = i.as_secs(), "running as service"),
            None => tracing::info!("running a single pass"),
        }

        let mut summary = ServiceSummary::default();
        loop {
            if self.stop.is_requested() {
                tracing::info!("stop requested, exiting");
                break;
            }

            summary.passes += 1;
            match self.run_one_pass().await {
                Ok(report) => summary.last_report = Some(report),
                Err(e) if self.interval.is_none() => return Err(e.context("pass failed")),
                Err(e) => {
                    summary.failed_passes += 1;
                    tracing::error!(pass = summary.passes, "error during pass: {:#}", e);
                }
            }

            let Some(interval) = self.interval else {
                break;
            };
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.stop.stopped() => {
                    tracing::info!("stop requested, exiting");
                    break;
                }
            }
        }
        Ok(summary)
    }
}
