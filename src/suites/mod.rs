//! Scenario catalog
//!
//! Two suites mirror the two halves of the API: the accommodation builder
//! (`backend`) and the autism profile generator (`profiles`).

pub mod backend;
pub mod profiles;

use serde::Serialize;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::http::ApiResponse;
use crate::testing::{Checks, Harness};

/// Group of related scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    /// Accommodation generation, storage and validation
    Backend,
    /// Autism profile generation, tiers and access control
    Profiles,
}

impl Suite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suite::Backend => "backend",
            Suite::Profiles => "profiles",
        }
    }
}

/// What a scenario does when run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    ApiHealth,
    GenerateFree,
    GenerateHero,
    Storage,
    ApiValidation,
    HistoryApi,
    BasicGeneration,
    HeroEnhanced,
    ProfileInsights,
    AccessControl,
    DocumentProcessing,
    CrudOperations,
    PlanEnforcement,
}

impl ScenarioKind {
    pub async fn run(self, harness: &Harness) -> Checks {
        match self {
            ScenarioKind::ApiHealth => backend::api_health(harness).await,
            ScenarioKind::GenerateFree => backend::generate_free(harness).await,
            ScenarioKind::GenerateHero => backend::generate_hero(harness).await,
            ScenarioKind::Storage => backend::storage(harness).await,
            ScenarioKind::ApiValidation => backend::api_validation(harness).await,
            ScenarioKind::HistoryApi => backend::history_api(harness).await,
            ScenarioKind::BasicGeneration => profiles::basic_generation(harness).await,
            ScenarioKind::HeroEnhanced => profiles::hero_enhanced(harness).await,
            ScenarioKind::ProfileInsights => profiles::profile_insights(harness).await,
            ScenarioKind::AccessControl => profiles::access_control(harness).await,
            ScenarioKind::DocumentProcessing => profiles::document_processing(harness).await,
            ScenarioKind::CrudOperations => profiles::crud_operations(harness).await,
            ScenarioKind::PlanEnforcement => profiles::plan_enforcement(harness).await,
        }
    }
}

/// A named test case against the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub key: &'static str,
    pub title: &'static str,
    pub suite: Suite,
    pub kind: ScenarioKind,
}

const fn scenario(
    key: &'static str,
    title: &'static str,
    suite: Suite,
    kind: ScenarioKind,
) -> Scenario {
    Scenario {
        key,
        title,
        suite,
        kind,
    }
}

static CATALOG: [Scenario; 13] = [
    scenario("api_health", "API Health", Suite::Backend, ScenarioKind::ApiHealth),
    scenario(
        "generate_free",
        "Accommodation Generation - Free Plan",
        Suite::Backend,
        ScenarioKind::GenerateFree,
    ),
    scenario(
        "generate_hero",
        "Accommodation Generation - Hero Plan",
        Suite::Backend,
        ScenarioKind::GenerateHero,
    ),
    scenario("storage", "Accommodation Storage", Suite::Backend, ScenarioKind::Storage),
    scenario("api_validation", "API Validation", Suite::Backend, ScenarioKind::ApiValidation),
    scenario("history_api", "Accommodation History API", Suite::Backend, ScenarioKind::HistoryApi),
    scenario(
        "basic_generation",
        "Basic Profile Generation",
        Suite::Profiles,
        ScenarioKind::BasicGeneration,
    ),
    scenario(
        "hero_enhanced",
        "Hero Plan Enhanced Profile",
        Suite::Profiles,
        ScenarioKind::HeroEnhanced,
    ),
    scenario(
        "profile_insights",
        "Profile Insights",
        Suite::Profiles,
        ScenarioKind::ProfileInsights,
    ),
    scenario("access_control", "Access Control", Suite::Profiles, ScenarioKind::AccessControl),
    scenario(
        "document_processing",
        "Document Processing",
        Suite::Profiles,
        ScenarioKind::DocumentProcessing,
    ),
    scenario(
        "crud_operations",
        "Profile CRUD Operations",
        Suite::Profiles,
        ScenarioKind::CrudOperations,
    ),
    scenario(
        "plan_enforcement",
        "Plan Type Enforcement",
        Suite::Profiles,
        ScenarioKind::PlanEnforcement,
    ),
];

/// Every scenario, in run order
pub fn catalog() -> &'static [Scenario] {
    &CATALOG
}

/// Scenarios filtered by suite and, if non-empty, by key
pub fn select(suite: Option<Suite>, only: &[String]) -> Result<Vec<Scenario>> {
    if let Some(unknown) = only
        .iter()
        .find(|key| !CATALOG.iter().any(|s| s.key == key.as_str()))
    {
        return Err(Error::UnknownScenario(unknown.clone()));
    }

    Ok(CATALOG
        .iter()
        .copied()
        .filter(|s| suite.map_or(true, |suite| s.suite == suite))
        .filter(|s| only.is_empty() || only.iter().any(|key| key == s.key))
        .collect())
}

/// How a single request turned out, after the generic status checks
pub(crate) enum Reply {
    /// 2xx with a JSON body
    Json(Value),
    /// 401 where the scenario accepts it
    AuthEnforced,
    /// Already recorded as a failure
    Failed,
}

/// Apply the status/body rules shared by every scenario
pub(crate) fn receive(
    checks: &mut Checks,
    step: &str,
    result: Result<ApiResponse>,
    accept_auth: bool,
) -> Reply {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            checks.request_failed(step, &e);
            return Reply::Failed;
        }
    };

    if accept_auth && response.status == 401 {
        checks.note(format!("{step}: authentication required (auth boundary enforced)"));
        return Reply::AuthEnforced;
    }

    if !response.is_success() {
        checks.unexpected_status(step, &response);
        return Reply::Failed;
    }

    match response.json() {
        Ok(body) => Reply::Json(body),
        Err(e) => {
            checks.fail(format!("{step}: {e}"));
            Reply::Failed
        }
    }
}
