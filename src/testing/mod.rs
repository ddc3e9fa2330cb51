//! Assertion harness
//!
//! Scenarios from [`crate::suites`] run through [`Harness`], record their
//! observations in [`Checks`], and end up as [`TestResult`]s in a
//! [`Report`]. Validation is pure; rendering lives in [`report`].

mod checks;
pub mod report;
mod runner;
pub mod validate;

pub use checks::{Checks, Diagnostic, Level, Strictness};
pub use report::{Report, TestResult};
pub use runner::{Harness, RunEvent};

#[cfg(test)]
pub(crate) use runner::test_harness;
