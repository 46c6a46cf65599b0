//! Raw account snapshot as extracted from the remote, before any parsing.

/// Everything one refresh of the account page yields, still as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSnapshot {
    /// Available transfer as shown by the remote (e.g. "1.5 GB").
    pub quota_text: Option<String>,
    pub groups: Vec<RawGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub rows: Vec<RawFileRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFileRow {
    pub url: Option<String>,
    pub size_text: Option<String>,
}

impl RawFileRow {
    pub fn new(url: impl Into<String>, size_text: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            size_text: Some(size_text.into()),
        }
    }
}
