//! Local target path derivation.
//!
//! A file's local name is the last path segment of its URL, sanitized for
//! Linux. With [`FileLayout::Flat`] two URLs sharing a basename land on the
//! same path; [`FileLayout::PerGroup`] namespaces files by group identifier.

mod path;
mod sanitize;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use path::filename_from_url_path;
pub use sanitize::sanitize_component;

/// How downloaded files are arranged under the download directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileLayout {
    /// `<root>/<filename>`
    #[default]
    Flat,
    /// `<root>/<group id>/<filename>`
    PerGroup,
}

/// Sanitized local filename for `url`, or `None` if the URL has no usable
/// final path segment.
pub fn local_filename(url: &str) -> Option<String> {
    let raw = filename_from_url_path(url)?;
    Some(sanitize_component(&raw)).filter(|s| !s.is_empty())
}

/// Full local path for `url` under `root`, according to `layout`.
pub fn target_path(root: &Path, layout: FileLayout, group_id: &str, url: &str) -> Option<PathBuf> {
    let filename = local_filename(url)?;
    match layout {
        FileLayout::Flat => Some(root.join(filename)),
        FileLayout::PerGroup => {
            let dir = Some(sanitize_component(group_id))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "_".to_string());
            Some(root.join(dir).join(filename))
        }
    }
}
