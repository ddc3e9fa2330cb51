//! Accommodation API harness - contract checks for the accommodation builder
//!
//! Drives the accommodation and autism profile REST endpoints of a running
//! application, validates the JSON it returns, and reports pass/fail per
//! scenario.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod suites;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Config, Error, Result};
pub use testing::{Harness, Report, Strictness};
