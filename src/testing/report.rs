//! Scenario results and console rendering

use colored::Colorize;
use serde::Serialize;

use crate::common::Result;

use super::checks::{Diagnostic, Level, Strictness};

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub key: String,
    pub title: String,
    pub passed: bool,
    pub elapsed_ms: u64,
    pub diagnostics: Vec<Diagnostic>,
}

/// All results of a run, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub api_base: String,
    pub strictness: Strictness,
    pub results: Vec<TestResult>,
}

impl Report {
    pub fn new(api_base: impl Into<String>, strictness: Strictness) -> Self {
        Self {
            api_base: api_base.into(),
            strictness,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let value = serde_json::json!({
            "api_base": self.api_base,
            "strictness": self.strictness,
            "passed": self.passed_count(),
            "total": self.total(),
            "success": self.all_passed(),
            "results": self.results,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

/// Heading printed before a scenario starts
pub fn render_start(title: &str) -> String {
    format!("\n{} {}", "Running:".blue().bold(), title.white().bold())
}

/// Diagnostics and verdict for a finished scenario
pub fn render_result(result: &TestResult) -> String {
    let mut out = String::new();

    for diagnostic in &result.diagnostics {
        let marker = match diagnostic.level {
            Level::Info => "✓".green(),
            Level::Warning => "!".yellow(),
            Level::Failure => "✗".red(),
        };
        out.push_str(&format!("  {} {}\n", marker, diagnostic.message));
    }

    let verdict = if result.passed {
        "PASSED".green().bold()
    } else {
        "FAILED".red().bold()
    };
    out.push_str(&format!(
        "  {}: {} {}",
        result.title,
        verdict,
        format!("({} ms)", result.elapsed_ms).dimmed()
    ));

    out
}

/// End-of-run summary table
pub fn render_summary(report: &Report, heading: &str) -> String {
    let rule = "=".repeat(70);
    let mut out = format!("\n{rule}\n{}\n{rule}\n", heading.bold());

    for result in &report.results {
        let status = if result.passed {
            "PASSED".green()
        } else {
            "FAILED".red()
        };
        out.push_str(&format!("{}: {}\n", result.title, status));
    }

    out.push_str(&format!(
        "\nOverall: {}/{} tests passed\n",
        report.passed_count(),
        report.total()
    ));

    if report.all_passed() {
        out.push_str(&format!("{}", "All scenarios PASSED".green().bold()));
    } else {
        out.push_str(&format!(
            "{}",
            "Some scenarios FAILED - see details above".red().bold()
        ));
    }

    out
}
