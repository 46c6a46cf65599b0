//! Remote account interface.
//!
//! The scheduler only depends on this trait; how the snapshot is obtained
//! (scraping, API, fixture) is up to the implementation.

use anyhow::Result;

use crate::inventory::RawSnapshot;

/// The remote side of the service: current quota and inventory, and group deletion.
pub trait RemoteAccount: Send + Sync {
    /// Fetches the current quota figure and file groups.
    fn fetch_snapshot(&self) -> Result<RawSnapshot>;

    /// Deletes one group remotely. Called only for fully verified groups.
    fn delete_group(&self, group_id: &str) -> Result<()>;
}

impl<R: RemoteAccount + ?Sized> RemoteAccount for std::sync::Arc<R> {
    fn fetch_snapshot(&self) -> Result<RawSnapshot> {
        (**self).fetch_snapshot()
    }

    fn delete_group(&self, group_id: &str) -> Result<()> {
        (**self).delete_group(group_id)
    }
}
