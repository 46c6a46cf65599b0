//! CLI command handlers, one file per command.

mod delete;
mod run;
mod status;
mod stop;

pub use delete::run_delete;
pub use run::run_service;
pub use status::run_status;
pub use stop::run_stop;
