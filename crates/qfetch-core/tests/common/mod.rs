//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod account_server;
pub mod fakes;
