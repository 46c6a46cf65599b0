//! Inventory model: quota, groups and files of one account snapshot.
//!
//! An [`Inventory`] is rebuilt wholesale from every [`RawSnapshot`]; nothing
//! in it is mutated after construction.

mod snapshot;

use std::collections::BTreeMap;
use std::fmt;

use crate::size::parse_size_opt;

pub use snapshot::{RawFileRow, RawGroup, RawSnapshot};

/// One downloadable remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub url: String,
    /// `None` when the remote size text could not be parsed.
    pub expected_size: Option<u64>,
}

/// Identifies one remotely deletable group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub id: String,
    pub name: String,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: GroupKey,
    /// Files in listing order.
    pub files: Vec<FileEntry>,
}

impl Group {
    /// Sum of all known expected sizes.
    pub fn known_size(&self) -> u64 {
        self.files.iter().filter_map(|f| f.expected_size).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Available transfer in bytes; 0 when the remote did not report a usable figure.
    pub quota: u64,
    pub groups: BTreeMap<GroupKey, Group>,
}

impl Inventory {
    /// Builds an inventory from a raw snapshot.
    ///
    /// Unknown or unparseable quota becomes 0. Rows without a URL or size
    /// text are dropped; groups without an identifier are dropped. A repeated
    /// group key replaces the earlier group.
    pub fn build(snapshot: RawSnapshot) -> Self {
        let quota = snapshot
            .quota_text
            .as_deref()
            .and_then(parse_size_opt)
            .unwrap_or(0);

        let mut groups = BTreeMap::new();
        for raw in snapshot.groups {
            let Some(id) = raw.id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
                tracing::warn!(name = ?raw.name, "skipping group without identifier");
                continue;
            };
            let key = GroupKey {
                id,
                name: raw.name.map(|s| s.trim().to_string()).unwrap_or_default(),
            };

            let files: Vec<FileEntry> = raw
                .rows
                .into_iter()
                .filter_map(|row| match (row.url, row.size_text) {
                    (Some(url), Some(size)) if !url.trim().is_empty() => Some(FileEntry {
                        url: url.trim().to_string(),
                        expected_size: parse_size_opt(size.trim()),
                    }),
                    _ => {
                        tracing::debug!(group_id = %key.id, "skipping malformed file row");
                        None
                    }
                })
                .collect();

            let group = Group {
                key: key.clone(),
                files,
            };
            if groups.insert(key.clone(), group).is_some() {
                tracing::warn!(
                    group_id = %key.id,
                    "duplicate group in snapshot; keeping the last one"
                );
            }
        }

        Self { quota, groups }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn file_count(&self) -> usize {
        self.groups.values().map(|g| g.files.len()).sum()
    }
}
