pub mod config;
pub mod logging;

pub mod control;
pub mod inventory;
pub mod probe;
pub mod quota;
pub mod rapidhost;
pub mod remote;
pub mod retry;
pub mod scheduler;
pub mod service;
pub mod size;
pub mod transfer;
pub mod url_model;
