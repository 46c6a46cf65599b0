//! CLI for the qfetch download service.

mod commands;
mod control_socket;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use qfetch_core::config::{self, QfetchConfig};
use qfetch_core::rapidhost::RapidhostClient;
use std::path::PathBuf;
use std::time::Duration;

use commands::{run_delete, run_service, run_status, run_stop};

/// Top-level CLI for qfetch.
#[derive(Debug, Parser)]
#[command(name = "qfetch")]
#[command(about = "qfetch: fetch remote file groups within the account's transfer quota", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Account credentials; fall back to config and environment.
#[derive(Debug, Clone, Args)]
pub struct AccountArgs {
    /// Account username (default: `account.username` from config).
    #[arg(short, long, env = "QFETCH_USERNAME")]
    pub username: Option<String>,

    /// Account password.
    #[arg(short, long, env = "QFETCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Account base URL (default: `account.base_url` from config).
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

impl AccountArgs {
    /// Builds the account client from flags, falling back to config.
    pub fn client(&self, cfg: &QfetchConfig) -> Result<RapidhostClient> {
        let base_url = self.base_url.as_deref().unwrap_or(&cfg.account.base_url);
        let Some(username) = self.username.clone().or_else(|| cfg.account.username.clone()) else {
            anyhow::bail!("no username: pass --username or set account.username in config.toml");
        };
        let Some(password) = self.password.clone() else {
            anyhow::bail!("no password: pass --password or set QFETCH_PASSWORD");
        };
        RapidhostClient::new(base_url, username, password)
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every group that fits the transfer quota, deleting completed groups remotely.
    Run {
        #[command(flatten)]
        account: AccountArgs,

        /// Root path for downloaded files (default: config `download_dir`, then current directory).
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Only process groups whose name contains this text.
        #[arg(short, long)]
        filter: Option<String>,

        /// Repeat a pass every SECS seconds until stopped.
        #[arg(short, long, value_name = "SECS", conflicts_with = "once")]
        interval: Option<u64>,

        /// Run a single pass even if config sets `repeat_interval_secs`.
        #[arg(long)]
        once: bool,
    },

    /// Show quota, groups and the local state of every file (read-only).
    Status {
        #[command(flatten)]
        account: AccountArgs,

        /// Root path for downloaded files.
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Delete one remote group by its identifier.
    Delete {
        #[command(flatten)]
        account: AccountArgs,

        /// Group identifier (as shown by `qfetch status`).
        group_id: String,
    },

    /// Ask a running `qfetch run` to stop after its current pass.
    Stop,
}

fn resolve_root(root: Option<PathBuf>, cfg: &QfetchConfig) -> Result<PathBuf> {
    match root.or_else(|| cfg.download_dir.clone()) {
        Some(r) => Ok(r),
        None => Ok(std::env::current_dir()?),
    }
}

/// `--once` wins; otherwise the flag, then config. Zero means one-shot.
fn resolve_interval(interval: Option<u64>, once: bool, cfg: &QfetchConfig) -> Option<Duration> {
    if once {
        return None;
    }
    interval
        .or(cfg.repeat_interval_secs)
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                account,
                root,
                filter,
                interval,
                once,
            } => {
                let root = resolve_root(root, &cfg)?;
                let filter = filter.or_else(|| cfg.filter.clone());
                let interval = resolve_interval(interval, once, &cfg);
                run_service(&cfg, &account, &root, filter, interval).await?;
            }
            CliCommand::Status { account, root } => {
                let root = resolve_root(root, &cfg)?;
                run_status(&cfg, &account, &root).await?;
            }
            CliCommand::Delete { account, group_id } => {
                run_delete(&cfg, &account, &group_id).await?
            }
            CliCommand::Stop => run_stop().await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
