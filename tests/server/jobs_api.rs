use reqwest::StatusCode;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{spawn_app, workflow_run_response};

#[tokio::test]
async fn create_job_runs_workflow_and_stores_result() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/run"))
        .and(header("Authorization", "Bearer test-workflow-key"))
        .and(body_partial_json(serde_json::json!({
            "workflow_id": "cover-thumbnail",
            "inputs": { "prompt": "moody lighthouse at dusk" }
        })))
        .respond_with(workflow_run_response(
            "task-42",
            "https://cdn.test/out/42.png",
        ))
        .expect(1)
        .mount(&app.workflow_mock)
        .await;

    let response = client
        .post(app.api_url("/jobs"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "prompt": "moody lighthouse at dusk" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let job: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(job["status"], "succeeded");
    assert_eq!(job["result_image_url"], "https://cdn.test/out/42.png");
    assert_eq!(job["provider_task_id"], "task-42");
    assert!(job["completed_at"].is_string());
}

#[tokio::test]
async fn provider_failure_marks_job_failed() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/run"))
        .respond_with(ResponseTemplate::new(500).set_body_string("provider exploded"))
        .mount(&app.workflow_mock)
        .await;

    let response = client
        .post(app.api_url("/jobs"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "prompt": "stormy coastline" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // The pending row was still written and marked failed
    let jobs: serde_json::Value = client
        .get(app.api_url("/jobs"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    let items = jobs["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["status"], "failed");
    assert!(
        items[0]["error"]
            .as_str()
            .unwrap()
            .contains("provider returned status 500")
    );
}

#[tokio::test]
async fn workflow_with_no_outputs_is_an_upstream_error() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/run"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "task_id": "task-empty", "outputs": [] })),
        )
        .mount(&app.workflow_mock)
        .await;

    let response = client
        .post(app.api_url("/jobs"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "prompt": "empty harvest" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn blank_prompt_is_rejected_without_calling_provider() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // No mock mounted: a provider call would 404 and surface as 502,
    // so a 400 here proves the request never left the server.
    let response = client
        .post(app.api_url("/jobs"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "prompt": "   " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_job_scoped_to_owner() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/run"))
        .respond_with(workflow_run_response("task-7", "https://cdn.test/7.png"))
        .mount(&app.workflow_mock)
        .await;

    let created: serde_json::Value = client
        .post(app.api_url("/jobs"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "prompt": "quiet orchard" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_i64().unwrap();

    let response = client
        .get(app.api_url(&format!("/jobs/{id}")))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(app.api_url("/jobs/999999"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_jobs_newest_first() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/run"))
        .respond_with(workflow_run_response("task-x", "https://cdn.test/x.png"))
        .mount(&app.workflow_mock)
        .await;

    for prompt in ["first", "second", "third"] {
        let response = client
            .post(app.api_url("/jobs"))
            .bearer_auth(&app.auth_token)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let page: serde_json::Value = client
        .get(app.api_url("/jobs"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(page["total"], 3);
}

#[tokio::test]
async fn job_runs_are_recorded_in_usage_log() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/run"))
        .respond_with(workflow_run_response("task-log", "https://cdn.test/l.png"))
        .mount(&app.workflow_mock)
        .await;

    let response = client
        .post(app.api_url("/jobs"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "prompt": "logged run" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::CREATED);

    // The log insert is fire-and-forget; give it a moment to land.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let logs: serde_json::Value = client
        .get(app.api_url("/usage/requests"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    let entries = logs.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["provider"], "workflow");
    assert_eq!(entries[0]["endpoint"], "workflows/run");
    assert_eq!(entries[0]["status"], "ok");
    assert!(entries[0]["duration_ms"].as_i64().unwrap() >= 0);
}
