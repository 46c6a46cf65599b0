//! Quota-aware group scheduler.
//!
//! A pass walks every admitted group of a fresh inventory: files already on
//! disk with the right size are skipped, the rest are reserved against the
//! pass-local quota ledger and fetched, then verified by size. Only groups
//! with zero failures are deleted remotely.

mod filter;
mod group;
mod pass;
mod report;

pub use filter::GroupFilter;
pub use group::{schedule_group, SchedulerSettings};
pub use pass::run_pass;
pub use report::{FailureKind, FileFailure, GroupOutcome, GroupReport, PassReport};
