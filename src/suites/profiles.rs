//! Autism profile generator scenarios
//!
//! Every endpoint here sits behind authentication. The harness only holds a
//! placeholder token, so a 401 on an authenticated call counts as the auth
//! boundary doing its job.

use serde_json::{json, Value};

use crate::common::Result;
use crate::http::{ApiResponse, Auth};
use crate::testing::validate::{
    array_len, mentions_any, missing_keys, paragraph_count, present_keys, Count,
};
use crate::testing::{Checks, Harness};

use super::{receive, Reply};

const GENERATE_PATH: &str = "/autism-profiles/generate";
const LIST_PATH: &str = "/autism-profiles";
const MOCK_PROFILE_PATH: &str = "/autism-profiles/mock-profile-id";
const SHARE_PATH: &str = "/autism-profiles/mock-profile-id/share";

const PROFILE_FIELDS: [&str; 5] = [
    "profileId",
    "generatedProfile",
    "profileType",
    "studentName",
    "createdBy",
];

/// Fields only a hero-tier response may carry
pub const HERO_FIELDS: [&str; 4] = [
    "profileInsights",
    "helpfulSupports",
    "situationsToAvoid",
    "classroomTips",
];

const INSIGHT_FIELDS: [&str; 3] = ["topNeeds", "topRecommendations", "redFlags"];

/// The "what helps / what hurts" chart lists
const CHART_FIELDS: [&str; 3] = ["helpfulSupports", "situationsToAvoid", "classroomTips"];

const DOCUMENT_KEYWORDS: [&str; 5] = ["iep", "evaluation", "assessment", "report", "document"];

/// Statuses accepted from lookups against a profile id that does not exist
const LOOKUP_STATUSES: [u16; 3] = [200, 404, 401];

/// Profile tier reported in `profileType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Standard,
    Hero,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Hero => "hero",
        }
    }

    /// 2-3 paragraphs standard, 5-6 hero, with a margin either side
    pub fn paragraphs(self) -> Count {
        match self {
            Tier::Standard => Count::Between(2, 4),
            Tier::Hero => Count::Between(4, 8),
        }
    }
}

pub fn standard_request() -> Value {
    json!({
        "studentId": "child_emma",
        "sensoryPreferences": {
            "selected": ["auditory", "tactile"],
            "calming_strategies": "quiet corner with weighted blanket"
        },
        "communicationStyle": {
            "primary_method": "Limited verbal",
            "effective_strategies": "visual schedules and simple language"
        },
        "behavioralTriggers": {
            "triggers": ["transitions", "changes"],
            "other_triggers": "unexpected loud noises"
        },
        "homeSupports": "Visual timer for transitions, consistent bedtime routine",
        "goals": "Improve communication skills, reduce transition anxiety"
    })
}

pub fn hero_request() -> Value {
    json!({
        "studentId": "child_david",
        "sensoryPreferences": {
            "selected": ["visual", "proprioceptive"],
            "calming_strategies": "deep pressure activities and fidget tools"
        },
        "communicationStyle": {
            "primary_method": "Verbal with AAC support",
            "effective_strategies": "picture cards and social stories"
        },
        "behavioralTriggers": {
            "triggers": ["loud noises", "crowded spaces"],
            "other_triggers": "changes in routine without warning"
        },
        "homeSupports": "Structured daily schedule, sensory breaks every 30 minutes",
        "goals": "Increase independent communication, improve social interaction skills",
        "individualStrengths": "Excellent memory for details, loves animals",
        "learningStyle": "Visual learner, needs hands-on activities",
        "environmentalPreferences": "Quiet corner away from high traffic areas",
        "supplementalDocuments": [
            {
                "name": "IEP_2024.pdf",
                "content": "Current IEP shows need for sensory breaks and visual supports"
            }
        ]
    })
}

pub fn insights_request() -> Value {
    json!({
        "studentId": "child_sofia",
        "sensoryPreferences": {
            "selected": ["tactile", "vestibular"],
            "calming_strategies": "swing time and textured materials"
        },
        "communicationStyle": {
            "primary_method": "Non-verbal with device",
            "effective_strategies": "AAC device and gesture prompts"
        },
        "behavioralTriggers": {
            "triggers": ["unexpected touch", "bright lights"],
            "other_triggers": "too many people talking at once"
        },
        "homeSupports": "Dimmed lighting, quiet spaces available",
        "goals": "Expand AAC vocabulary, increase social engagement"
    })
}

pub fn documents_request() -> Value {
    json!({
        "studentId": "child_david",
        "sensoryPreferences": {
            "selected": ["auditory"],
            "calming_strategies": "noise-canceling headphones"
        },
        "communicationStyle": {
            "primary_method": "Verbal",
            "effective_strategies": "clear, simple instructions"
        },
        "behavioralTriggers": {
            "triggers": ["loud noises"],
            "other_triggers": "unexpected schedule changes"
        },
        "homeSupports": "Consistent routines and advance notice of changes",
        "goals": "Improve noise tolerance and flexibility",
        "supplementalDocuments": [
            {
                "name": "IEP_2024.pdf",
                "content": "Current IEP shows need for sensory breaks every 30 minutes and visual schedule supports"
            },
            {
                "name": "Evaluation_Report.pdf",
                "content": "Recent evaluation indicates strengths in visual processing and need for structured environment"
            }
        ]
    })
}

/// Minimal free-plan body used for plan enforcement
pub fn free_enforcement_request() -> Value {
    json!({
        "studentId": "child_emma",
        "sensoryPreferences": {"selected": ["auditory"], "calming_strategies": "quiet space"},
        "communicationStyle": {"primary_method": "Verbal", "effective_strategies": "simple language"},
        "behavioralTriggers": {"triggers": ["transitions"], "other_triggers": "loud noises"},
        "homeSupports": "Visual schedules",
        "goals": "Improve transitions"
    })
}

/// Minimal hero-plan body used for plan enforcement
pub fn hero_enforcement_request() -> Value {
    json!({
        "studentId": "child_david",
        "sensoryPreferences": {"selected": ["visual"], "calming_strategies": "fidget tools"},
        "communicationStyle": {"primary_method": "AAC", "effective_strategies": "picture cards"},
        "behavioralTriggers": {"triggers": ["crowds"], "other_triggers": "schedule changes"},
        "homeSupports": "Structured environment",
        "goals": "Increase communication",
        "individualStrengths": "Great memory",
        "learningStyle": "Visual learner",
        "environmentalPreferences": "Quiet corner"
    })
}

async fn generate(
    harness: &Harness,
    request: &Value,
    auth: &Auth,
    hero: bool,
) -> Result<ApiResponse> {
    let timeout = if hero {
        harness.timeouts().hero_generate()
    } else {
        harness.timeouts().generate()
    };
    harness.client().post(GENERATE_PATH, request, auth, timeout).await
}

pub async fn basic_generation(harness: &Harness) -> Checks {
    let mut checks = harness.checks();
    let result = generate(harness, &standard_request(), &Auth::Mock, false).await;

    if let Reply::Json(body) = receive(&mut checks, "generate", result, true) {
        check_standard_profile(&body, &mut checks);
    }
    checks
}

pub async fn hero_enhanced(harness: &Harness) -> Checks {
    let mut checks = harness.checks();
    let result = generate(harness, &hero_request(), &Auth::Mock, true).await;

    if let Reply::Json(body) = receive(&mut checks, "generate", result, true) {
        check_hero_profile(&body, &mut checks);
    }
    checks
}

pub async fn profile_insights(harness: &Harness) -> Checks {
    let mut checks = harness.checks();
    let result = generate(harness, &insights_request(), &Auth::Mock, true).await;

    if let Reply::Json(body) = receive(&mut checks, "generate", result, true) {
        check_insights(&body, Count::AtLeast(4), &mut checks);
    }
    checks
}

/// Shared fields every profile must carry, plus the `profileType` enum
fn check_profile_basics(body: &Value, checks: &mut Checks) -> bool {
    let missing = missing_keys(body, &PROFILE_FIELDS);
    if !missing.is_empty() {
        checks.fail(format!("missing fields {missing:?}"));
        return false;
    }

    let profile_type = body["profileType"].as_str().unwrap_or_default();
    if profile_type != Tier::Standard.as_str() && profile_type != Tier::Hero.as_str() {
        checks.fail(format!(
            "profileType must be 'standard' or 'hero', got {}",
            body["profileType"]
        ));
        return false;
    }
    true
}

fn check_paragraphs(body: &Value, tier: Tier, checks: &mut Checks) {
    let text = body["generatedProfile"].as_str().unwrap_or_default();
    let count = paragraph_count(text);
    let expected = tier.paragraphs();
    checks.expect_soft(
        expected.admits(count),
        format!("generated {count} paragraphs ({} profile)", tier.as_str()),
        format!("expected {expected} paragraphs, got {count}"),
    );
}

/// A free-tier profile: standard fields, no hero-only fields
pub fn check_standard_profile(body: &Value, checks: &mut Checks) {
    if !check_profile_basics(body, checks) {
        return;
    }

    let profile_type = body["profileType"].as_str().unwrap_or_default();
    if profile_type != Tier::Standard.as_str() {
        checks.warn(format!("expected 'standard' profile type, got '{profile_type}'"));
    }

    check_paragraphs(body, Tier::Standard, checks);

    let leaked = present_keys(body, &HERO_FIELDS);
    if leaked.is_empty() {
        checks.note("no hero plan fields present");
    } else {
        checks.fail(format!("hero plan fields should not be present: {leaked:?}"));
    }
}

/// A hero-tier profile: standard fields, every hero field, and insights
pub fn check_hero_profile(body: &Value, checks: &mut Checks) {
    if !check_profile_basics(body, checks) {
        return;
    }

    let missing = missing_keys(body, &HERO_FIELDS);
    if !missing.is_empty() {
        checks.fail(format!("missing hero plan fields {missing:?}"));
        return;
    }

    let profile_type = body["profileType"].as_str().unwrap_or_default();
    if profile_type != Tier::Hero.as_str() {
        checks.fail(format!("expected 'hero' profile type, got '{profile_type}'"));
        return;
    }

    check_paragraphs(body, Tier::Hero, checks);
    check_insights(body, Count::AtLeast(3), checks);
}

/// Insight lists must exist with three items each; chart lists are sized by `chart`
pub fn check_insights(body: &Value, chart: Count, checks: &mut Checks) {
    let Some(insights) = body.get("profileInsights").filter(|v| v.is_object()) else {
        checks.fail("no profileInsights in response");
        return;
    };

    let missing = missing_keys(insights, &INSIGHT_FIELDS);
    if !missing.is_empty() {
        checks.fail(format!("missing insight fields {missing:?}"));
        return;
    }

    for field in INSIGHT_FIELDS {
        let len = array_len(insights, field).unwrap_or(0);
        checks.expect_soft(
            Count::Exactly(3).admits(len),
            format!("{field} has {len} items"),
            format!("{field} should have 3 items, got {len}"),
        );
    }

    let missing = missing_keys(body, &CHART_FIELDS);
    if !missing.is_empty() {
        checks.fail(format!("missing chart fields {missing:?}"));
        return;
    }

    for field in CHART_FIELDS {
        let len = array_len(body, field).unwrap_or(0);
        checks.expect_soft(
            chart.admits(len),
            format!("{field} has {len} items"),
            format!("{field} should have {chart} items, got {len}"),
        );
    }
}

pub async fn access_control(harness: &Harness) -> Checks {
    let mut checks = harness.checks();
    let request = json!({"studentId": "child_emma"});
    let timeout = harness.timeouts().request();

    match harness
        .client()
        .post(GENERATE_PATH, &request, &Auth::None, timeout)
        .await
    {
        Ok(response) if response.status == 401 => {
            checks.note("correctly rejected unauthenticated request")
        }
        Ok(response) => checks.fail(format!(
            "should reject unauthenticated request, got {}",
            response.status
        )),
        Err(e) => {
            checks.request_failed("unauthenticated access", &e);
            return checks;
        }
    }

    let invalid = Auth::Token("invalid_token".to_string());
    match harness
        .client()
        .post(GENERATE_PATH, &request, &invalid, timeout)
        .await
    {
        Ok(response) => checks.expect_soft(
            response.status == 401,
            "correctly rejected invalid token",
            format!("invalid token handling - got {}", response.status),
        ),
        Err(e) => checks.request_failed("invalid token", &e),
    }
    checks
}

pub async fn document_processing(harness: &Harness) -> Checks {
    let mut checks = harness.checks();
    let result = generate(harness, &documents_request(), &Auth::Mock, true).await;

    if let Reply::Json(body) = receive(&mut checks, "generate", result, true) {
        let text = body["generatedProfile"].as_str().unwrap_or_default();
        checks.expect_soft(
            mentions_any(text, &DOCUMENT_KEYWORDS),
            "profile integrates document insights",
            "profile may not reference uploaded documents",
        );
    }
    checks
}

pub async fn crud_operations(harness: &Harness) -> Checks {
    let mut checks = harness.checks();
    let client = harness.client();
    let timeout = harness.timeouts().request();

    match client.get(LIST_PATH, &Auth::Mock, timeout).await {
        Ok(response) if response.status == 200 => {
            let body = match response.json() {
                Ok(body) => body,
                Err(e) => {
                    checks.fail(format!("profile list: {e}"));
                    return checks;
                }
            };
            match array_len(&body, "profiles") {
                Some(count) => checks.note(format!("profile list returned {count} profiles")),
                None => checks.warn("profile list: unexpected response structure"),
            }
        }
        Ok(response) if response.status == 401 => {
            checks.note("profile list: authentication required")
        }
        Ok(response) => checks.warn(format!("profile list: status {}", response.status)),
        Err(e) => {
            checks.request_failed("profile list", &e);
            return checks;
        }
    }

    let result = client.get(MOCK_PROFILE_PATH, &Auth::Mock, timeout).await;
    if !check_lookup(&mut checks, "single profile", result) {
        return checks;
    }

    let share = json!({"shareWithEmails": ["teacher@school.edu"]});
    let result = client.post(SHARE_PATH, &share, &Auth::Mock, timeout).await;
    check_lookup(&mut checks, "profile sharing", result);

    checks
}

/// Lookups by a mock id may answer 200, 404 or 401; returns false on transport failure
fn check_lookup(checks: &mut Checks, step: &str, result: Result<ApiResponse>) -> bool {
    match result {
        Ok(response) => {
            checks.expect_soft(
                LOOKUP_STATUSES.contains(&response.status),
                format!("{step}: endpoint responds appropriately ({})", response.status),
                format!("{step}: unexpected status {}", response.status),
            );
            true
        }
        Err(e) => {
            checks.request_failed(step, &e);
            false
        }
    }
}

pub async fn plan_enforcement(harness: &Harness) -> Checks {
    let mut checks = harness.checks();

    let free = generate(harness, &free_enforcement_request(), &Auth::Mock, false).await;
    let hero = generate(harness, &hero_enforcement_request(), &Auth::Mock, false).await;

    let (free, hero) = match (free, hero) {
        (Ok(free), Ok(hero)) => (free, hero),
        (Err(e), _) => {
            checks.request_failed("free plan", &e);
            return checks;
        }
        (_, Err(e)) => {
            checks.request_failed("hero plan", &e);
            return checks;
        }
    };

    let acceptable = |status: u16| status == 200 || status == 401;
    if !acceptable(free.status) || !acceptable(hero.status) {
        checks.fail(format!(
            "unexpected responses - free: {}, hero: {}",
            free.status, hero.status
        ));
        return checks;
    }
    checks.note("API handles both plan types appropriately");

    if free.status == 200 && hero.status == 200 {
        match (free.json(), hero.json()) {
            (Ok(free), Ok(hero)) => check_tier_separation(&free, &hero, &mut checks),
            (Err(e), _) | (_, Err(e)) => checks.fail(e.to_string()),
        }
    }
    checks
}

/// Free responses carry no hero field; hero responses carry all of them
pub fn check_tier_separation(free: &Value, hero: &Value, checks: &mut Checks) {
    let leaked = present_keys(free, &HERO_FIELDS);
    if !leaked.is_empty() {
        checks.fail(format!("free plan response includes hero features {leaked:?}"));
    }

    let missing = missing_keys(hero, &HERO_FIELDS);
    if !missing.is_empty() {
        checks.fail(format!("hero plan response missing hero features {missing:?}"));
    }

    if leaked.is_empty() && missing.is_empty() {
        checks.note("feature differentiation working correctly");
    }
}
