//! Group filter: which groups a pass considers at all.

use std::fmt;

/// Excluded groups are neither fetched nor deleted.
#[derive(Default)]
pub enum GroupFilter {
    /// Every group is admitted.
    #[default]
    None,
    /// Admit groups whose name contains the substring.
    Substring(String),
    /// Admit groups whose name satisfies the predicate.
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl GroupFilter {
    /// Substring filter from an optional config/CLI value; empty means no filter.
    pub fn from_substring(s: Option<String>) -> Self {
        match s {
            Some(s) if !s.is_empty() => GroupFilter::Substring(s),
            _ => GroupFilter::None,
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        GroupFilter::Predicate(Box::new(f))
    }

    pub fn admits(&self, group_name: &str) -> bool {
        match self {
            GroupFilter::None => true,
            GroupFilter::Substring(s) => group_name.contains(s.as_str()),
            GroupFilter::Predicate(f) => f(group_name),
        }
    }
}

impl fmt::Debug for GroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupFilter::None => write!(f, "None"),
            GroupFilter::Substring(s) => f.debug_tuple("Substring").field(s).finish(),
            GroupFilter::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}
