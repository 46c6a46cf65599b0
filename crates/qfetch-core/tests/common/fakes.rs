//! In-memory account and fetcher for driving passes without a network.

use anyhow::{anyhow, Result};
use qfetch_core::control::StopSignal;
use qfetch_core::inventory::{RawFileRow, RawGroup, RawSnapshot};
use qfetch_core::remote::RemoteAccount;
use qfetch_core::transfer::{Fetcher, TransferError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

pub const MB: u64 = 1024 * 1024;

pub fn group(id: &str, name: &str, files: &[(&str, &str)]) -> RawGroup {
    RawGroup {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        rows: files
            .iter()
            .map(|(url, size)| RawFileRow::new(*url, *size))
            .collect(),
    }
}

pub fn snapshot(quota: &str, groups: Vec<RawGroup>) -> RawSnapshot {
    RawSnapshot {
        quota_text: Some(quota.to_string()),
        groups,
    }
}

/// Serves the same snapshot every time and records deletions.
#[derive(Default)]
pub struct FakeAccount {
    pub snapshot: Mutex<RawSnapshot>,
    pub deleted: Mutex<Vec<String>>,
    pub refreshes: Mutex<u32>,
    /// Snapshot requests fail when set.
    pub fail_snapshots: bool,
    /// Deletions fail when set.
    pub fail_deletes: bool,
    /// Requests a stop once this many refreshes have happened.
    pub stop_after: Option<(u32, StopSignal)>,
}

impl FakeAccount {
    pub fn new(snapshot: RawSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Self::default()
        }
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> u32 {
        *self.refreshes.lock().unwrap()
    }
}

impl RemoteAccount for FakeAccount {
    fn fetch_snapshot(&self) -> Result<RawSnapshot> {
        let mut refreshes = self.refreshes.lock().unwrap();
        *refreshes += 1;
        if let Some((n, stop)) = &self.stop_after {
            if *refreshes >= *n {
                stop.request_stop();
            }
        }
        if self.fail_snapshots {
            return Err(anyhow!("account page unreachable"));
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    fn delete_group(&self, group_id: &str) -> Result<()> {
        if self.fail_deletes {
            return Err(anyhow!("delete rejected"));
        }
        self.deleted.lock().unwrap().push(group_id.to_string());
        Ok(())
    }
}

/// Writes a configured number of bytes per URL; unknown URLs get HTTP 404.
#[derive(Default)]
pub struct FakeFetcher {
    pub bodies: HashMap<String, u64>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with(bodies: &[(&str, u64)]) -> Self {
        Self {
            bodies: bodies.iter().map(|(u, n)| (u.to_string(), *n)).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        self.calls.lock().unwrap().push(url.to_string());
        let Some(len) = self.bodies.get(url) else {
            return Err(TransferError::Http(404));
        };
        std::fs::write(dest, vec![0u8; *len as usize])?;
        Ok(*len)
    }
}
