//! Sequential scenario runner
//!
//! Scenarios run one at a time, in catalog order. A scenario never aborts
//! the run: transport errors are already folded into its diagnostics.

use std::time::Instant;

use crate::common::{Config, Result, Timeouts};
use crate::http::ApiClient;
use crate::suites::Scenario;

use super::checks::{Checks, Strictness};
use super::report::{Report, TestResult};

/// Progress notifications emitted while a run is in flight
pub enum RunEvent<'a> {
    Started(&'a Scenario),
    Finished(&'a TestResult),
}

/// The assertion harness: a client plus the policy it runs under
pub struct Harness {
    client: ApiClient,
    timeouts: Timeouts,
    strictness: Strictness,
}

impl Harness {
    pub fn new(client: ApiClient, timeouts: Timeouts, strictness: Strictness) -> Self {
        Self {
            client,
            timeouts,
            strictness,
        }
    }

    /// Build a harness that talks to the configured target over reqwest
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            ApiClient::from_config(config)?,
            config.timeouts.clone(),
            Strictness::from_flag(config.policy.strict),
        ))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Fresh diagnostics collector under this harness's policy
    pub fn checks(&self) -> Checks {
        Checks::new(self.strictness)
    }

    /// Wait for a write to become visible to subsequent reads
    pub async fn settle(&self) {
        let delay = self.timeouts.settle();
        if !delay.is_zero() {
            tracing::debug!(delay_secs = delay.as_secs(), "waiting for write to settle");
            tokio::time::sleep(delay).await;
        }
    }

    /// Run one scenario to completion
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        tracing::info!(scenario = scenario.key, "running scenario");
        let started = Instant::now();

        let checks = scenario.kind.run(self).await;

        let passed = !checks.has_failures();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(scenario = scenario.key, passed, elapsed_ms, "scenario finished");

        TestResult {
            key: scenario.key.to_string(),
            title: scenario.title.to_string(),
            passed,
            elapsed_ms,
            diagnostics: checks.into_diagnostics(),
        }
    }

    /// Run every scenario in order and collect the report
    pub async fn run<F>(&self, scenarios: &[Scenario], mut on_event: F) -> Report
    where
        F: FnMut(RunEvent<'_>),
    {
        let mut report = Report::new(self.client.api_base(), self.strictness);

        for scenario in scenarios {
            on_event(RunEvent::Started(scenario));
            let result = self.run_scenario(scenario).await;
            on_event(RunEvent::Finished(&result));
            report.record(result);
        }

        report
    }
}

/// Harness over a scripted transport with no settling delay
#[cfg(test)]
pub(crate) fn test_harness(
    fake: &crate::http::fake::FakeTransport,
    strictness: Strictness,
) -> Harness {
    use crate::http::fake::FAKE_API_BASE;

    let timeouts = Timeouts {
        settle_secs: 0,
        ..Timeouts::default()
    };
    let client = ApiClient::new(FAKE_API_BASE, "mock_token_for_testing", Box::new(fake.clone()));
    Harness::new(client, timeouts, strictness)
}
