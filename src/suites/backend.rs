//! Accommodation builder scenarios
//!
//! Covers `/api/root`, `/api/accommodations/generate` and
//! `/api/accommodations`. None of these endpoints require authentication.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use crate::http::Auth;
use crate::testing::validate::{
    error_mentions_required, mentions_any, missing_keys, missing_or_empty, parse_timestamp, Count,
};
use crate::testing::{Checks, Harness};

use super::{receive, Reply};

const GENERATE_PATH: &str = "/accommodations/generate";
const HISTORY_PATH: &str = "/accommodations";

const ITEM_FIELDS: [&str; 4] = ["title", "description", "category", "implementation"];

const CATEGORIES: [&str; 5] = [
    "Academic",
    "Behavioral",
    "Sensory",
    "Communication",
    "Environmental",
];

const RELEVANCE_KEYWORDS: [&str; 8] = [
    "sensory",
    "transition",
    "visual",
    "routine",
    "break",
    "support",
    "autism",
    "movement",
];

const STORED_FIELDS: [&str; 7] = [
    "id",
    "childName",
    "gradeLevel",
    "diagnosisAreas",
    "planType",
    "accommodations",
    "timestamp",
];

const HISTORY_SAMPLE_FIELDS: [&str; 4] = ["id", "childName", "accommodations", "timestamp"];

/// Length of a hyphenated UUID
const RECORD_ID_LEN: usize = 36;

/// Plan tier requested from the accommodation generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Free,
    Hero,
}

impl Plan {
    /// Expected number of generated accommodations (about 8 free, 15 hero)
    pub fn expected_count(self) -> Count {
        match self {
            Plan::Free => Count::Between(5, 10),
            Plan::Hero => Count::Between(12, 18),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Plan::Free => "free plan",
            Plan::Hero => "hero plan",
        }
    }
}

pub fn free_plan_request() -> Value {
    json!({
        "childName": "Alex",
        "gradeLevel": "3rd",
        "diagnosisAreas": ["Autism Spectrum Disorder (ASD)", "Sensory Processing Disorder"],
        "sensoryPreferences": ["Sound sensitivity (auditory)", "Need for movement breaks"],
        "behavioralChallenges": ["Difficulty with transitions", "Need for routine/predictability"],
        "communicationMethod": "verbal",
        "additionalInfo": "Alex does well with visual supports and needs advance notice of changes",
        "planType": "free"
    })
}

pub fn hero_plan_request() -> Value {
    json!({
        "childName": "Emma",
        "gradeLevel": "5th",
        "diagnosisAreas": ["Autism Spectrum Disorder (ASD)", "ADHD"],
        "sensoryPreferences": ["Visual processing strengths", "Need for quiet environment"],
        "behavioralChallenges": ["Executive functioning challenges", "Social interaction difficulties"],
        "communicationMethod": "verbal with AAC support",
        "additionalInfo": "Emma excels in structured environments and benefits from clear expectations",
        "planType": "hero"
    })
}

pub fn storage_request(child_name: &str) -> Value {
    json!({
        "childName": child_name,
        "gradeLevel": "2nd",
        "diagnosisAreas": ["Autism Spectrum Disorder (ASD)"],
        "sensoryPreferences": ["Visual supports"],
        "behavioralChallenges": ["Routine needs"],
        "communicationMethod": "verbal",
        "additionalInfo": "Test accommodation for storage verification",
        "planType": "free"
    })
}

/// Requests the generator must reject, with what makes each one invalid
pub fn invalid_requests() -> Vec<(Value, &'static str)> {
    vec![
        (json!({}), "empty request"),
        (json!({"childName": "Test"}), "missing gradeLevel"),
        (
            json!({"childName": "Test", "gradeLevel": "1st"}),
            "missing diagnosisAreas",
        ),
        (
            json!({"childName": "Test", "gradeLevel": "1st", "diagnosisAreas": []}),
            "empty diagnosisAreas",
        ),
        (
            json!({"childName": "Test", "gradeLevel": "1st", "diagnosisAreas": ["ASD"]}),
            "missing communicationMethod",
        ),
    ]
}

pub async fn api_health(harness: &Harness) -> Checks {
    let mut checks = harness.checks();
    let result = harness
        .client()
        .get("/root", &Auth::None, harness.timeouts().request())
        .await;

    if let Reply::Json(body) = receive(&mut checks, "health", result, false) {
        check_health(&body, &mut checks);
    }
    checks
}

pub fn check_health(body: &Value, checks: &mut Checks) {
    if body.get("message").and_then(Value::as_str) == Some("Hello World") {
        checks.note("API responded with Hello World");
    } else {
        checks.fail(format!("unexpected health response - {body}"));
    }
}

pub async fn generate_free(harness: &Harness) -> Checks {
    generate(harness, Plan::Free, free_plan_request()).await
}

pub async fn generate_hero(harness: &Harness) -> Checks {
    generate(harness, Plan::Hero, hero_plan_request()).await
}

async fn generate(harness: &Harness, plan: Plan, request: Value) -> Checks {
    let mut checks = harness.checks();
    let result = harness
        .client()
        .post(GENERATE_PATH, &request, &Auth::None, harness.timeouts().generate())
        .await;

    if let Reply::Json(body) = receive(&mut checks, "generate", result, false) {
        check_accommodations(&body, plan, &mut checks);
    }
    checks
}

/// Validate a generator reply: list present, sized for the plan, items well formed
pub fn check_accommodations(body: &Value, plan: Plan, checks: &mut Checks) {
    let Some(items) = body.get("accommodations").and_then(Value::as_array) else {
        checks.fail("missing 'accommodations' list in response");
        return;
    };

    let expected = plan.expected_count();
    checks.expect_soft(
        expected.admits(items.len()),
        format!("generated {} accommodations ({})", items.len(), plan.label()),
        format!(
            "expected {expected} accommodations for the {}, got {}",
            plan.label(),
            items.len()
        ),
    );

    let mut categories = BTreeSet::new();
    for (i, item) in items.iter().enumerate() {
        let n = i + 1;

        let missing = missing_or_empty(item, &ITEM_FIELDS);
        if !missing.is_empty() {
            checks.fail(format!("accommodation {n}: missing fields {missing:?}"));
            continue;
        }

        let category = item["category"].as_str().unwrap_or_default();
        if CATEGORIES.contains(&category) {
            categories.insert(category.to_string());
        } else {
            checks.warn(format!("accommodation {n}: invalid category '{category}'"));
        }

        let content = ["title", "description", "implementation"]
            .iter()
            .filter_map(|field| item[*field].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if !mentions_any(&content, &RELEVANCE_KEYWORDS) {
            checks.warn(format!("accommodation {n}: may not be autism-specific"));
        }
    }

    if !categories.is_empty() {
        checks.note(format!(
            "accommodations span {} categories: {}",
            categories.len(),
            categories.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
}

pub async fn storage(harness: &Harness) -> Checks {
    let child_name = format!("TestChild_{}", chrono::Utc::now().timestamp_millis());
    store_and_read_back(harness, &child_name).await
}

async fn store_and_read_back(harness: &Harness, child_name: &str) -> Checks {
    let mut checks = harness.checks();

    let result = harness
        .client()
        .post(
            GENERATE_PATH,
            &storage_request(child_name),
            &Auth::None,
            harness.timeouts().generate(),
        )
        .await;
    if !matches!(receive(&mut checks, "create record", result, false), Reply::Json(_)) {
        return checks;
    }
    checks.note(format!("created record for {child_name}"));

    harness.settle().await;

    let result = harness
        .client()
        .get(HISTORY_PATH, &Auth::None, harness.timeouts().request())
        .await;
    if let Reply::Json(body) = receive(&mut checks, "history", result, false) {
        check_history_contains(&body, child_name, &mut checks);
    }
    checks
}

/// The history must hold exactly one well-formed record for `child_name`
pub fn check_history_contains(body: &Value, child_name: &str, checks: &mut Checks) {
    let Some(records) = body.as_array() else {
        checks.fail("history response is not a list");
        return;
    };

    let matching: Vec<&Value> = records
        .iter()
        .filter(|record| record.get("childName").and_then(Value::as_str) == Some(child_name))
        .collect();

    match matching.as_slice() {
        [] => checks.fail(format!("record for {child_name} not found in history")),
        [record] => check_stored_record(record, checks),
        many => checks.fail(format!(
            "expected exactly one record for {child_name}, found {}",
            many.len()
        )),
    }

    checks.note(format!("history holds {} records", records.len()));
}

fn check_stored_record(record: &Value, checks: &mut Checks) {
    let missing = missing_keys(record, &STORED_FIELDS);
    if !missing.is_empty() {
        checks.fail(format!("stored record missing fields {missing:?}"));
        return;
    }

    let id = record["id"].as_str().unwrap_or_default();
    if id.chars().count() != RECORD_ID_LEN {
        checks.fail(format!("invalid record id format - {}", record["id"]));
        return;
    }

    match record["timestamp"].as_str().and_then(parse_timestamp) {
        Some(_) => checks.note(format!("stored record found with id {id}")),
        None => checks.fail(format!(
            "invalid timestamp format - {}",
            record["timestamp"]
        )),
    }
}

pub async fn api_validation(harness: &Harness) -> Checks {
    let mut checks = harness.checks();

    for (request, description) in invalid_requests() {
        let result = harness
            .client()
            .post(GENERATE_PATH, &request, &Auth::None, harness.timeouts().request())
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                checks.request_failed(description, &e);
                continue;
            }
        };

        if response.status != 400 {
            checks.fail(format!(
                "should have rejected {description} but got status {}",
                response.status
            ));
            continue;
        }

        let body = match response.json() {
            Ok(body) => body,
            Err(e) => {
                checks.fail(format!("{description}: {e}"));
                continue;
            }
        };
        checks.expect_soft(
            error_mentions_required(&body),
            format!("correctly rejected {description}"),
            format!("rejected {description} but with unexpected error message"),
        );
    }
    checks
}

pub async fn history_api(harness: &Harness) -> Checks {
    let mut checks = harness.checks();
    let result = harness
        .client()
        .get(HISTORY_PATH, &Auth::None, harness.timeouts().request())
        .await;

    if let Reply::Json(body) = receive(&mut checks, "history", result, false) {
        check_history_listing(&body, &mut checks);
    }
    checks
}

pub fn check_history_listing(body: &Value, checks: &mut Checks) {
    let Some(records) = body.as_array() else {
        checks.fail("history response is not a list");
        return;
    };
    checks.note(format!("retrieved {} accommodation records", records.len()));

    if let Some(sample) = records.first() {
        let missing = missing_keys(sample, &HISTORY_SAMPLE_FIELDS);
        checks.expect_soft(
            missing.is_empty(),
            "record structure is valid",
            format!("sample record missing fields {missing:?}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeTransport;
    use crate::http::Method;
    use crate::testing::{test_harness, Level, Strictness};

    fn item(title: &str, category: &str) -> Value {
        json!({
            "title": title,
            "description": "Provide a visual schedule before each transition",
            "category": category,
            "implementation": "Teacher reviews the schedule each morning"
        })
    }

    fn accommodations(n: usize) -> Value {
        let items: Vec<Value> = (0..n)
            .map(|i| item(&format!("Support {i}"), CATEGORIES[i % CATEGORIES.len()]))
            .collect();
        json!({ "accommodations": items })
    }

    fn stored(child_name: &str) -> Value {
        json!({
            "id": "0b6f7c3e-3f4a-4d1e-9c2b-5a8e7d6f1a2b",
            "childName": child_name,
            "gradeLevel": "2nd",
            "diagnosisAreas": ["Autism Spectrum Disorder (ASD)"],
            "planType": "free",
            "accommodations": [],
            "timestamp": "2024-09-01T12:30:00.000Z"
        })
    }

    #[tokio::test]
    async fn test_health_passes_on_hello_world() {
        let fake = FakeTransport::new();
        fake.reply(Method::Get, "/root", 200, json!({"message": "Hello World"}));
        let checks = api_health(&test_harness(&fake, Strictness::Strict)).await;
        assert!(!checks.has_failures());
    }

    #[tokio::test]
    async fn test_health_fails_on_other_message() {
        let fake = FakeTransport::new();
        fake.reply(Method::Get, "/root", 200, json!({"message": "Hi"}));
        let checks = api_health(&test_harness(&fake, Strictness::Lenient)).await;
        assert!(checks.has_failures());
    }

    #[tokio::test]
    async fn test_free_plan_end_to_end() {
        let fake = FakeTransport::new();
        fake.reply(Method::Post, GENERATE_PATH, 200, accommodations(8));
        let checks = generate_free(&test_harness(&fake, Strictness::Strict)).await;

        assert!(!checks.has_failures(), "{:?}", checks.diagnostics());
        let sent = fake.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body.as_ref().unwrap()["planType"], "free");
        assert_eq!(sent[0].body.as_ref().unwrap()["childName"], "Alex");
    }

    #[tokio::test]
    async fn test_generation_timeout_is_a_failed_result() {
        let fake = FakeTransport::new();
        fake.timeout(Method::Post, GENERATE_PATH);
        let checks = generate_hero(&test_harness(&fake, Strictness::Lenient)).await;

        assert!(checks.has_failures());
        assert!(checks.diagnostics()[0].message.contains("timed out after 60 seconds"));
    }

    #[tokio::test]
    async fn test_server_error_fails_with_body() {
        let fake = FakeTransport::new();
        fake.reply(Method::Post, GENERATE_PATH, 500, json!({"error": "LLM quota exceeded"}));
        let checks = generate_free(&test_harness(&fake, Strictness::Lenient)).await;

        assert!(checks.has_failures());
        assert!(checks.diagnostics()[0].message.contains("LLM quota exceeded"));
    }

    #[test]
    fn test_count_outside_plan_range_is_soft() {
        let mut lenient = Checks::new(Strictness::Lenient);
        check_accommodations(&accommodations(4), Plan::Free, &mut lenient);
        assert!(!lenient.has_failures());
        assert!(lenient.diagnostics().iter().any(|d| d.level == Level::Warning));

        let mut strict = Checks::new(Strictness::Strict);
        check_accommodations(&accommodations(4), Plan::Free, &mut strict);
        assert!(strict.has_failures());
    }

    #[test]
    fn test_hero_count_range() {
        let mut checks = Checks::new(Strictness::Strict);
        check_accommodations(&accommodations(15), Plan::Hero, &mut checks);
        assert!(!checks.has_failures(), "{:?}", checks.diagnostics());
    }

    #[test]
    fn test_item_missing_field_is_hard() {
        let mut body = accommodations(6);
        body["accommodations"][2]["implementation"] = json!("");

        let mut checks = Checks::new(Strictness::Lenient);
        check_accommodations(&body, Plan::Free, &mut checks);
        assert!(checks.has_failures());
        assert!(checks.diagnostics().iter().any(|d| {
            d.message.contains("accommodation 3") && d.message.contains("implementation")
        }));
    }

    #[test]
    fn test_unknown_category_and_irrelevant_text_warn() {
        let body = json!({"accommodations": [{
            "title": "Extra time",
            "description": "Allow more time on tests",
            "category": "Testing",
            "implementation": "Double the allotted minutes"
        }]});

        let mut checks = Checks::new(Strictness::Lenient);
        check_accommodations(&body, Plan::Free, &mut checks);
        assert!(!checks.has_failures());
        let warnings = checks
            .diagnostics()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count();
        // count, category, relevance
        assert_eq!(warnings, 3);
    }

    #[test]
    fn test_missing_accommodations_list_fails() {
        let mut checks = Checks::new(Strictness::Lenient);
        check_accommodations(&json!({"plan": []}), Plan::Free, &mut checks);
        assert!(checks.has_failures());
    }

    #[tokio::test]
    async fn test_storage_write_then_read() {
        let fake = FakeTransport::new();
        fake.reply(Method::Post, GENERATE_PATH, 200, accommodations(6));
        fake.reply(
            Method::Get,
            HISTORY_PATH,
            200,
            json!([stored("Someone Else"), stored("TestChild_42")]),
        );
        let harness = test_harness(&fake, Strictness::Strict);

        let checks = store_and_read_back(&harness, "TestChild_42").await;
        assert!(!checks.has_failures(), "{:?}", checks.diagnostics());

        let sent = fake.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].body.as_ref().unwrap()["childName"], "TestChild_42");
        assert_eq!(sent[1].method, Method::Get);
        assert_eq!(sent[1].url, harness.client().url(HISTORY_PATH));
    }

    #[tokio::test]
    async fn test_storage_uses_unique_child_name() {
        let fake = FakeTransport::new();
        fake.reply(Method::Post, GENERATE_PATH, 200, accommodations(6));
        fake.reply(Method::Get, HISTORY_PATH, 200, json!([]));

        let checks = storage(&test_harness(&fake, Strictness::Lenient)).await;
        assert!(checks.has_failures(), "record absent from history must fail");

        let sent = fake.requests();
        let child_name = sent[0].body.as_ref().unwrap()["childName"].as_str().unwrap();
        assert!(child_name.starts_with("TestChild_"));
    }

    #[tokio::test]
    async fn test_storage_stops_when_create_fails() {
        let fake = FakeTransport::new();
        fake.reply(Method::Post, GENERATE_PATH, 500, json!({"error": "boom"}));
        let checks = storage(&test_harness(&fake, Strictness::Lenient)).await;

        assert!(checks.has_failures());
        assert_eq!(fake.requests().len(), 1);
    }

    #[test]
    fn test_history_record_rules() {
        let mut checks = Checks::new(Strictness::Lenient);
        check_history_contains(&json!([stored("Bo"), stored("Bo")]), "Bo", &mut checks);
        assert!(checks.has_failures(), "duplicates must fail");

        let mut bad_id = stored("Bo");
        bad_id["id"] = json!("1234");
        let mut checks = Checks::new(Strictness::Lenient);
        check_history_contains(&json!([bad_id]), "Bo", &mut checks);
        assert!(checks.has_failures(), "short id must fail");

        let mut bad_time = stored("Bo");
        bad_time["timestamp"] = json!("last tuesday");
        let mut checks = Checks::new(Strictness::Lenient);
        check_history_contains(&json!([bad_time]), "Bo", &mut checks);
        assert!(checks.has_failures(), "unparseable timestamp must fail");

        let mut partial = stored("Bo");
        partial.as_object_mut().unwrap().remove("planType");
        let mut checks = Checks::new(Strictness::Lenient);
        check_history_contains(&json!([partial]), "Bo", &mut checks);
        assert!(checks.has_failures(), "missing planType must fail");

        let mut checks = Checks::new(Strictness::Lenient);
        check_history_contains(&json!({"records": []}), "Bo", &mut checks);
        assert!(checks.has_failures(), "non-list must fail");
    }

    #[tokio::test]
    async fn test_validation_requires_400_with_required_message() {
        let fake = FakeTransport::new();
        fake.reply(Method::Post, GENERATE_PATH, 400, json!({"error": "Missing required fields"}));
        let checks = api_validation(&test_harness(&fake, Strictness::Strict)).await;

        assert!(!checks.has_failures(), "{:?}", checks.diagnostics());
        assert_eq!(fake.requests().len(), invalid_requests().len());
        assert_eq!(checks.diagnostics().len(), 5);
    }

    #[tokio::test]
    async fn test_validation_accepting_invalid_body_fails() {
        let fake = FakeTransport::new();
        fake.reply(Method::Post, GENERATE_PATH, 400, json!({"error": "Missing required fields"}));
        fake.reply(Method::Post, GENERATE_PATH, 200, accommodations(8));
        let checks = api_validation(&test_harness(&fake, Strictness::Lenient)).await;

        // First reply is served once, then the 200 repeats for the other four.
        let failures = checks
            .diagnostics()
            .iter()
            .filter(|d| d.level == Level::Failure)
            .count();
        assert_eq!(failures, 4);
    }

    #[tokio::test]
    async fn test_validation_vague_message_is_soft() {
        let fake = FakeTransport::new();
        fake.reply(Method::Post, GENERATE_PATH, 400, json!({"error": "Bad request"}));

        let lenient = api_validation(&test_harness(&fake, Strictness::Lenient)).await;
        assert!(!lenient.has_failures());

        let strict = api_validation(&test_harness(&fake, Strictness::Strict)).await;
        assert!(strict.has_failures());
    }

    #[tokio::test]
    async fn test_validation_non_json_rejection_fails() {
        let fake = FakeTransport::new();
        fake.reply_raw(Method::Post, GENERATE_PATH, 400, "<html>Bad Request</html>");
        let checks = api_validation(&test_harness(&fake, Strictness::Lenient)).await;

        assert!(checks.has_failures());
        let failures: Vec<_> = checks
            .diagnostics()
            .iter()
            .filter(|d| d.level == Level::Failure)
            .collect();
        assert_eq!(failures.len(), invalid_requests().len());
        assert!(failures[0].message.contains("not valid JSON"));
    }

    #[tokio::test]
    async fn test_history_listing() {
        let fake = FakeTransport::new();
        fake.reply(Method::Get, HISTORY_PATH, 200, json!([stored("Alex")]));
        let checks = history_api(&test_harness(&fake, Strictness::Strict)).await;
        assert!(!checks.has_failures());

        let fake = FakeTransport::new();
        fake.reply(Method::Get, HISTORY_PATH, 200, json!({"items": []}));
        let checks = history_api(&test_harness(&fake, Strictness::Lenient)).await;
        assert!(checks.has_failures());
    }
}
