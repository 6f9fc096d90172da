//! End-to-end pipeline tests against a mocked Gemini endpoint.
//!
//! All tests share one mock server and one global configuration, so every scenario tags its
//! requests with unique sentinel strings and registers mocks that match only those.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use httpmock::{Method::POST, MockServer};
use lexbrief::{
    config, logging,
    pipeline::{AnalysisError, AnalysisService, Stage, StageError},
};
use serde_json::json;
use tokio::sync::OnceCell;

static INIT: OnceCell<()> = OnceCell::const_new();
static MOCK_SERVER: OnceCell<&'static MockServer> = OnceCell::const_new();

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn set_env(key: &str, value: &str) {
    // SAFETY: Tests run in a single process and establish deterministic configuration upfront.
    unsafe { std::env::set_var(key, value) }
}

async fn harness() -> &'static MockServer {
    INIT.get_or_init(|| async {
        let mock_server = Box::leak(Box::new(MockServer::start_async().await));

        set_env("COMPLETION_PROVIDER", "gemini");
        set_env("COMPLETION_MODEL", "gemini-2.0-flash");
        set_env("GEMINI_API_KEY", "test-key");
        set_env("GEMINI_BASE_URL", &mock_server.base_url());
        set_env("STAGE_TIMEOUT_MS", "1000");

        MOCK_SERVER.set(mock_server).ok();

        config::init_config();
        logging::init_tracing();
    })
    .await;

    MOCK_SERVER.get().expect("mock server initialized")
}

fn gemini_text_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] }
        }]
    })
}

fn text_document(content: &str) -> String {
    format!("data:text/plain;base64,{}", BASE64.encode(content.as_bytes()))
}

#[tokio::test]
async fn full_pipeline_produces_consistent_result() {
    let server = harness().await;
    let doc_content = "DOC-ALPHA one-page lease agreement between tenant and landlord.";
    let doc_b64 = BASE64.encode(doc_content.as_bytes());

    let summary_mock = server
        .mock_async(|when, then| {
            when.method(POST).path(GENERATE_PATH).body_contains(&doc_b64);
            then.status(200)
                .json_body(gemini_text_body("SUM-ALPHA the lease runs twelve months."));
        })
        .await;
    let mind_map_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .body_contains("mindmap")
                .body_contains("SUM-ALPHA");
            then.status(200).json_body(gemini_text_body(
                "```mermaid\nmindmap\n  root((Lease))\n    Parties\n    Term\n```",
            ));
        })
        .await;
    let flowchart_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .body_contains("flowchart TD")
                .body_contains("SUM-ALPHA");
            then.status(200).json_body(gemini_text_body(
                "flowchart TD\n  A[Sign lease] --> B[Pay deposit]",
            ));
        })
        .await;

    let service = AnalysisService::new();
    let result = service
        .analyze(text_document(doc_content))
        .await
        .expect("analysis result");

    summary_mock.assert_async().await;
    mind_map_mock.assert_async().await;
    flowchart_mock.assert_async().await;

    assert!(!result.summary.is_empty());
    assert!(result.summary.contains("SUM-ALPHA"));
    assert!(result.mind_map.starts_with("mindmap"));
    assert!(result.flowchart.starts_with("flowchart TD"));
}

#[tokio::test]
async fn summary_failure_surfaces_a_single_upstream_error() {
    let server = harness().await;
    let doc_content = "DOC-BRAVO agreement that will fail to summarize.";
    let doc_b64 = BASE64.encode(doc_content.as_bytes());

    let summary_mock = server
        .mock_async(|when, then| {
            when.method(POST).path(GENERATE_PATH).body_contains(&doc_b64);
            then.status(500).body("provider exploded");
        })
        .await;

    let service = AnalysisService::new();
    let error = service
        .analyze(text_document(doc_content))
        .await
        .expect_err("summary failure");

    summary_mock.assert_async().await;
    match error {
        AnalysisError::Stage(stage_error) => assert_eq!(stage_error.stage(), Stage::Summary),
        other => panic!("expected stage error, got {other:?}"),
    }
}

#[tokio::test]
async fn diagram_failure_returns_no_partial_result() {
    let server = harness().await;
    let doc_content = "DOC-CHARLIE agreement whose mind map fails.";
    let doc_b64 = BASE64.encode(doc_content.as_bytes());

    server
        .mock_async(|when, then| {
            when.method(POST).path(GENERATE_PATH).body_contains(&doc_b64);
            then.status(200)
                .json_body(gemini_text_body("SUM-CHARLIE the parties settle."));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .body_contains("mindmap")
                .body_contains("SUM-CHARLIE");
            then.status(503).body("mind map capacity exceeded");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .body_contains("flowchart TD")
                .body_contains("SUM-CHARLIE");
            then.status(200)
                .json_body(gemini_text_body("flowchart TD\n  A --> B"));
        })
        .await;

    let service = AnalysisService::new();
    let error = service
        .analyze(text_document(doc_content))
        .await
        .expect_err("mind map failure");

    match error {
        AnalysisError::Stage(stage_error) => assert_eq!(stage_error.stage(), Stage::MindMap),
        other => panic!("expected stage error, got {other:?}"),
    }
}

#[tokio::test]
async fn summary_timeout_aborts_before_diagram_stages() {
    let server = harness().await;
    let doc_content = "DOC-DELTA agreement whose summary stalls.";
    let doc_b64 = BASE64.encode(doc_content.as_bytes());

    let summary_mock = server
        .mock_async(|when, then| {
            when.method(POST).path(GENERATE_PATH).body_contains(&doc_b64);
            then.status(200)
                .delay(std::time::Duration::from_secs(3))
                .json_body(gemini_text_body("SUM-DELTA too late."));
        })
        .await;

    let service = AnalysisService::new();
    let error = service
        .analyze(text_document(doc_content))
        .await
        .expect_err("summary timeout");

    match error {
        AnalysisError::Stage(StageError::Timeout { stage, .. }) => {
            assert_eq!(stage, Stage::Summary);
        }
        other => panic!("expected timeout error, got {other:?}"),
    }

    // The stalled call was issued exactly once and nothing retried it.
    assert_eq!(summary_mock.hits_async().await, 1);
}

#[tokio::test]
async fn malformed_document_is_rejected_without_upstream_calls() {
    let _server = harness().await;

    let service = AnalysisService::new();
    let error = service
        .analyze("text/plain;base64,aGk=".to_string())
        .await
        .expect_err("validation failure");

    assert!(matches!(error, AnalysisError::Document(_)));
}

#[tokio::test]
async fn advice_flow_returns_checklist_with_references() {
    let server = harness().await;

    let advice_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .body_contains("QRY-ECHO unpaid overtime wages");
            then.status(200).json_body(gemini_text_body(
                "1. Collect your pay stubs.\n2. File a wage claim with your state labor agency.",
            ));
        })
        .await;

    let service = AnalysisService::new();
    let checklist = service
        .advise("QRY-ECHO unpaid overtime wages at my job".to_string())
        .await
        .expect("advice checklist");

    advice_mock.assert_async().await;
    let item = regex::Regex::new(r"(?m)^- \[ \] ").expect("pattern");
    assert_eq!(item.find_iter(&checklist).count(), 2);
    assert!(checklist.contains("- [ ] Collect your pay stubs."));
    assert!(checklist.contains("https://www.dol.gov/general/topic/wages"));
}
