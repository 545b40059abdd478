use reqwest::StatusCode;

use crate::helpers::spawn_app;

#[tokio::test]
async fn created_token_works_as_bearer_credential() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(app.api_url("/tokens"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "name": "ci" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(created["name"], "ci");
    let raw_token = created["token"].as_str().unwrap().to_string();
    assert!(!raw_token.is_empty());

    // The new token authenticates requests on its own
    let response = client
        .get(app.api_url("/projects"))
        .bearer_auth(&raw_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn blank_token_name_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(app.api_url("/tokens"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "name": "   " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_tokens_never_exposes_hashes_or_raw_tokens() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(app.api_url("/tokens"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "name": "laptop" }))
        .send()
        .await
        .expect("Failed to execute request");

    let tokens: serde_json::Value = client
        .get(app.api_url("/tokens"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    let items = tokens.as_array().unwrap();
    // The seeded token plus the one just created
    assert_eq!(items.len(), 2);
    for token in items {
        assert!(token.get("token_hash").is_none());
        assert!(token.get("token").is_none());
        assert!(token["name"].is_string());
    }
}

#[tokio::test]
async fn revoked_token_stops_authenticating() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(app.api_url("/tokens"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "name": "short-lived" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_i64().unwrap();
    let raw_token = created["token"].as_str().unwrap().to_string();

    let response = client
        .post(app.api_url(&format!("/tokens/{id}/revoke")))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(app.api_url("/projects"))
        .bearer_auth(&raw_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_bearer_token_is_unauthorized() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(app.api_url("/projects"))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(app.api_url("/projects"))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn usage_log_is_empty_without_provider_calls() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let logs: serde_json::Value = client
        .get(app.api_url("/usage/requests"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(logs.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn usage_limit_is_validated() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Out-of-range limits are clamped rather than rejected
    let response = client
        .get(app.api_url("/usage/requests?limit=100000"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}
