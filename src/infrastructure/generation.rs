use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::errors::AppError;

pub const PROVIDER_NAME: &str = "workflow";
const USER_AGENT: &str = "Covergen/0.3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of one workflow run: the provider-side task id and the image
/// outputs it produced.
#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub task_id: String,
    pub outputs: Vec<WorkflowOutput>,
    pub credits: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowOutput {
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Run the configured image-generation workflow once. A single
/// request/response cycle: no polling, no retries.
pub async fn run_workflow(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    workflow_id: &str,
    prompt: &str,
    source_image_url: Option<&str>,
) -> Result<WorkflowResult, AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::validation("prompt must not be empty"));
    }

    let request_body = RunRequest {
        workflow_id: workflow_id.to_string(),
        inputs: RunInputs {
            prompt: prompt.to_string(),
            image_url: source_image_url.map(String::from),
        },
    };

    let url = format!("{}/api/v1/workflows/run", base_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .header("User-Agent", USER_AGENT)
        .header("Authorization", format!("Bearer {api_key}"))
        .timeout(REQUEST_TIMEOUT)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| AppError::upstream(format!("workflow request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "(unreadable body)".to_string());
        return Err(AppError::upstream(format!(
            "workflow provider returned status {status}: {body}"
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AppError::upstream(format!("failed to read workflow response body: {e}")))?;

    let run: RunResponse = serde_json::from_str(&body)
        .map_err(|e| AppError::upstream(format!("failed to parse workflow response: {e}")))?;

    if run.outputs.is_empty() {
        return Err(AppError::upstream(format!(
            "workflow task {} produced no outputs",
            run.task_id
        )));
    }

    Ok(WorkflowResult {
        task_id: run.task_id,
        outputs: run.outputs,
        credits: run.credits,
    })
}

// --- Provider API types ---

#[derive(Debug, Serialize)]
struct RunRequest {
    workflow_id: String,
    inputs: RunInputs,
}

#[derive(Debug, Serialize)]
struct RunInputs {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    task_id: String,
    #[allow(dead_code)]
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    outputs: Vec<WorkflowOutput>,
    #[serde(default)]
    credits: Option<i64>,
}
