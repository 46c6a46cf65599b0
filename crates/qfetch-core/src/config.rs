use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::probe::DEFAULT_SIZE_TOLERANCE;
use crate::transfer::TransferBackend;
use crate::url_model::FileLayout;

/// Downloads smaller than this are taken to be an error page, not content.
pub const DEFAULT_MIN_VIABLE_BYTES: u64 = 7000;

pub const DEFAULT_BASE_URL: &str = "http://rapidhost.pl/";

/// Retry policy parameters for transfers (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per file (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

/// Remote account settings. The password is never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub base_url: String,
    pub username: Option<String>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
        }
    }
}

/// Global configuration loaded from `~/.config/qfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QfetchConfig {
    /// Base directory for downloads (None = current directory).
    pub download_dir: Option<PathBuf>,
    /// Only groups whose name contains this substring are processed.
    pub filter: Option<String>,
    /// Seconds between passes; None runs a single pass.
    pub repeat_interval_secs: Option<u64>,
    /// Allowed difference between expected and observed sizes.
    pub size_tolerance_bytes: u64,
    /// Smaller downloads are deleted as error pages.
    pub min_viable_bytes: u64,
    /// "flat" (default) or "per_group".
    pub layout: FileLayout,
    /// "curl" (default) or "command".
    pub transfer_backend: TransferBackend,
    /// Argv template for the command backend; `{url}` and `{output}` are substituted.
    pub downloader_command: Option<Vec<String>>,
    /// Optional bandwidth cap in bytes per second for the curl backend.
    pub max_bytes_per_sec: Option<u64>,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
    pub account: AccountConfig,
}

impl Default for QfetchConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            filter: None,
            repeat_interval_secs: None,
            size_tolerance_bytes: DEFAULT_SIZE_TOLERANCE,
            min_viable_bytes: DEFAULT_MIN_VIABLE_BYTES,
            layout: FileLayout::Flat,
            transfer_backend: TransferBackend::Curl,
            downloader_command: None,
            max_bytes_per_sec: None,
            retry: None,
            account: AccountConfig::default(),
        }
    }
}

impl QfetchConfig {
    /// Interval between passes; a zero interval counts as one-shot.
    pub fn repeat_interval(&self) -> Option<Duration> {
        self.repeat_interval_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("qfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<QfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = QfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: QfetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
