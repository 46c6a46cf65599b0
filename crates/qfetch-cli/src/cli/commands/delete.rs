//! `qfetch delete <group-id>` – delete one remote group.

use anyhow::{Context, Result};
use qfetch_core::config::QfetchConfig;
use qfetch_core::remote::RemoteAccount;

use crate::cli::AccountArgs;

pub async fn run_delete(cfg: &QfetchConfig, account: &AccountArgs, group_id: &str) -> Result<()> {
    let client = account.client(cfg)?;
    let id = group_id.to_string();
    tokio::task::spawn_blocking(move || client.delete_group(&id))
        .await
        .context("delete task")??;
    println!("Deleted group {group_id}");
    Ok(())
}
