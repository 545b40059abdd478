use reqwest::StatusCode;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{media_upload_response, png_bytes, spawn_app};

#[tokio::test]
async fn upload_stores_image_with_dimensions_and_checksum() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .and(header("Authorization", "Bearer test-media-key"))
        .respond_with(media_upload_response("gallery/abc123"))
        .expect(1)
        .mount(&app.media_mock)
        .await;

    let bytes = png_bytes(48, 32);
    let response = client
        .post(app.api_url("/gallery"))
        .bearer_auth(&app.auth_token)
        .body(bytes.clone())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let image: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(image["content_type"], "image/png");
    assert_eq!(image["width"], 48);
    assert_eq!(image["height"], 32);
    assert_eq!(image["byte_size"].as_i64(), Some(bytes.len() as i64));
    assert_eq!(image["checksum"].as_str().unwrap().len(), 64);
    assert_eq!(image["url"], "https://media.test/gallery/abc123.png");
    assert_eq!(image["source"], "uploaded");
}

#[tokio::test]
async fn duplicate_upload_returns_existing_row() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Exactly one media-host call for two identical uploads
    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(media_upload_response("gallery/dedup"))
        .expect(1)
        .mount(&app.media_mock)
        .await;

    let bytes = png_bytes(16, 16);

    let first = client
        .post(app.api_url("/gallery"))
        .bearer_auth(&app.auth_token)
        .body(bytes.clone())
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: serde_json::Value = first.json().await.unwrap();

    let second = client
        .post(app.api_url("/gallery"))
        .bearer_auth(&app.auth_token)
        .body(bytes)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status(), StatusCode::OK);
    let second: serde_json::Value = second.json().await.unwrap();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["checksum"], second["checksum"]);
}

#[tokio::test]
async fn non_image_bytes_are_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(app.api_url("/gallery"))
        .bearer_auth(&app.auth_token)
        .body("definitely not an image")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(app.api_url("/gallery"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn media_host_failure_surfaces_as_bad_gateway() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.media_mock)
        .await;

    let response = client
        .post(app.api_url("/gallery"))
        .bearer_auth(&app.auth_token)
        .body(png_bytes(8, 8))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn delete_removes_row_and_notifies_host() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(media_upload_response("gallery/doomed"))
        .mount(&app.media_mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/images/destroy"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.media_mock)
        .await;

    let image: serde_json::Value = client
        .post(app.api_url("/gallery"))
        .bearer_auth(&app.auth_token)
        .body(png_bytes(12, 12))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = image["id"].as_i64().unwrap();

    let response = client
        .delete(app.api_url(&format!("/gallery/{id}")))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(app.api_url(&format!("/gallery/{id}")))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_images_returns_page() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(media_upload_response("gallery/listed"))
        .mount(&app.media_mock)
        .await;

    // Two distinct images (different dimensions, different checksums)
    for size in [10u32, 20] {
        let response = client
            .post(app.api_url("/gallery"))
            .bearer_auth(&app.auth_token)
            .body(png_bytes(size, size))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let page: serde_json::Value = client
        .get(app.api_url("/gallery"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(page["total"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let filtered: serde_json::Value = client
        .get(app.api_url("/gallery?search=image%2Fpng"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(filtered["total"], 2);
}
