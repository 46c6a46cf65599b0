//! `qfetch status` – show quota, groups and local file state.

use anyhow::{Context, Result};
use qfetch_core::config::QfetchConfig;
use qfetch_core::inventory::Inventory;
use qfetch_core::probe::LocalState;
use qfetch_core::remote::RemoteAccount;
use qfetch_core::scheduler::SchedulerSettings;
use qfetch_core::size::format_size;
use std::path::Path;

use crate::cli::AccountArgs;

fn state_label(state: Option<LocalState>) -> &'static str {
    match state {
        None => "no-name",
        Some(LocalState::Missing) => "missing",
        Some(LocalState::Unverifiable { .. }) => "unknown-size",
        Some(LocalState::Mismatch { .. }) => "mismatch",
        Some(LocalState::Matches) => "ok",
    }
}

pub async fn run_status(cfg: &QfetchConfig, account: &AccountArgs, root: &Path) -> Result<()> {
    let client = account.client(cfg)?;
    let snapshot = tokio::task::spawn_blocking(move || client.fetch_snapshot())
        .await
        .context("status task")??;
    let inventory = Inventory::build(snapshot);
    let settings = SchedulerSettings::from_config(cfg, root);

    println!("Available transfer: {}", format_size(inventory.quota));
    if inventory.groups.is_empty() {
        println!("No file groups.");
        return Ok(());
    }
    for group in inventory.groups.values() {
        println!(
            "{:<10} {} ({} file(s), {})",
            group.key.id,
            group.key.name,
            group.files.len(),
            format_size(group.known_size())
        );
        for file in &group.files {
            let state = settings
                .target_for(&group.key.id, &file.url)
                .map(|path| settings.probe.state(&path, file.expected_size));
            let size = file
                .expected_size
                .map(format_size)
                .unwrap_or_else(|| "?".to_string());
            println!("    {:<12} {:>12}  {}", state_label(state), size, file.url);
        }
    }
    Ok(())
}
