//! Diagnostics collected while a scenario runs
//!
//! Every check is either hard (always a failure) or soft (a heuristic). The
//! [`Strictness`] policy decides whether a soft miss is recorded as a warning
//! or as a failure.

use serde::Serialize;

use crate::common::Error;
use crate::http::ApiResponse;

/// How soft checks are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Soft misses are warnings and do not fail the scenario
    #[default]
    Lenient,
    /// Soft misses fail the scenario
    Strict,
}

impl Strictness {
    pub fn from_flag(strict: bool) -> Self {
        if strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        }
    }
}

/// Severity of a single diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Warning,
    Failure,
}

/// One line of scenario output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Ordered diagnostics for one scenario
#[derive(Debug, Default)]
pub struct Checks {
    strictness: Strictness,
    diagnostics: Vec<Diagnostic>,
}

impl Checks {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            diagnostics: Vec::new(),
        }
    }

    fn push(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Info => tracing::debug!(%message, "check passed"),
            Level::Warning => tracing::debug!(%message, "check warned"),
            Level::Failure => tracing::debug!(%message, "check failed"),
        }
        self.diagnostics.push(Diagnostic { level, message });
    }

    /// Record a passing observation
    pub fn note(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    /// Record a soft miss
    pub fn warn(&mut self, message: impl Into<String>) {
        let level = match self.strictness {
            Strictness::Lenient => Level::Warning,
            Strictness::Strict => Level::Failure,
        };
        self.push(level, message);
    }

    /// Record a hard failure
    pub fn fail(&mut self, message: impl Into<String>) {
        self.push(Level::Failure, message);
    }

    /// Soft check: note on success, warn otherwise
    pub fn expect_soft(&mut self, ok: bool, pass: impl Into<String>, miss: impl Into<String>) {
        if ok {
            self.note(pass);
        } else {
            self.warn(miss);
        }
    }

    /// Record a transport failure for the named step
    pub fn request_failed(&mut self, step: &str, error: &Error) {
        self.fail(format!("{step}: request failed - {error}"));
    }

    /// Record an unexpected status with a body excerpt
    pub fn unexpected_status(&mut self, step: &str, response: &ApiResponse) {
        let snippet = response.snippet();
        if snippet.is_empty() {
            self.fail(format!("{step}: unexpected status {}", response.status));
        } else {
            self.fail(format!(
                "{step}: unexpected status {} - {snippet}",
                response.status
            ));
        }
    }

    pub fn has_failures(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Failure)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
