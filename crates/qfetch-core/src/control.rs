//! Service control: a shared stop signal and the control socket location.
//!
//! The service loop checks the signal before each pass and races it against
//! the inter-pass sleep. A running pass is never interrupted.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable stop request flag. All clones observe the same state.
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Ask the service to stop after the current pass. Idempotent.
    pub fn request_stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once a stop has been requested (immediately if it already was).
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

/// Default path for the control socket (XDG state dir, next to the log).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("qfetch")?.get_state_home();
    Ok(dir.join("qfetch").join("control.sock"))
}
