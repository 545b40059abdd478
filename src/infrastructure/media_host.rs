use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::errors::AppError;

pub const PROVIDER_NAME: &str = "media-host";
const USER_AGENT: &str = "Covergen/0.3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A stored asset on the media host.
#[derive(Debug, Clone, Deserialize)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
    pub bytes: i64,
    #[serde(default)]
    pub format: Option<String>,
}

/// Upload image bytes to the media host. The host expects a base64 data
/// URI in the JSON body and returns the public URL and host-side id.
pub async fn upload_image(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    bytes: &[u8],
    content_type: &str,
    folder: &str,
) -> Result<HostedImage, AppError> {
    let data_uri = format!("data:{content_type};base64,{}", STANDARD.encode(bytes));
    let request_body = UploadRequest {
        file: data_uri,
        folder: folder.to_string(),
    };

    let url = format!("{}/v1/images", base_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .header("User-Agent", USER_AGENT)
        .header("Authorization", format!("Bearer {api_key}"))
        .timeout(REQUEST_TIMEOUT)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| AppError::upstream(format!("media host upload failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "(unreadable body)".to_string());
        return Err(AppError::upstream(format!(
            "media host returned status {status}: {body}"
        )));
    }

    response
        .json::<HostedImage>()
        .await
        .map_err(|e| AppError::upstream(format!("failed to parse media host response: {e}")))
}

/// Ask the media host to delete an asset. Best-effort: failures are logged
/// and swallowed so local deletion always wins.
pub async fn delete_image(client: &reqwest::Client, base_url: &str, api_key: &str, public_id: &str) {
    let url = format!("{}/v1/images/destroy", base_url.trim_end_matches('/'));
    let request_body = DestroyRequest {
        public_id: public_id.to_string(),
    };

    let result = client
        .post(&url)
        .header("User-Agent", USER_AGENT)
        .header("Authorization", format!("Bearer {api_key}"))
        .timeout(REQUEST_TIMEOUT)
        .json(&request_body)
        .send()
        .await;

    match result {
        Ok(response) if !response.status().is_success() => {
            warn!(public_id, status = %response.status(), "media host delete returned non-success");
        }
        Err(err) => {
            warn!(public_id, error = %err, "media host delete request failed");
        }
        _ => {}
    }
}

// --- Media host API types ---

#[derive(Debug, Serialize)]
struct UploadRequest {
    file: String,
    folder: String,
}

#[derive(Debug, Serialize)]
struct DestroyRequest {
    public_id: String,
}
