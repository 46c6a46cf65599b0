//! `qfetch stop` – ask a running service to stop after its current pass.

use anyhow::Result;
use qfetch_core::control;

use crate::cli::control_socket;

pub async fn run_stop() -> Result<()> {
    let path = control::default_control_socket_path()?;
    if control_socket::send_stop(&path).await? {
        println!("Stop requested; the service exits after its current pass.");
    } else {
        println!("No running service.");
    }
    Ok(())
}
