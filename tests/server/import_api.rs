use reqwest::StatusCode;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{build_zip, media_upload_response, png_bytes, spawn_app};

async fn post_archive(app: &crate::helpers::TestApp, archive: Vec<u8>) -> reqwest::Response {
    reqwest::Client::new()
        .post(app.api_url("/import"))
        .bearer_auth(&app.auth_token)
        .header("Content-Type", "application/zip")
        .body(archive)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn import_creates_projects_from_folders() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(media_upload_response("covers/imported"))
        .mount(&app.media_mock)
        .await;

    let front = png_bytes(30, 40);
    let back = png_bytes(30, 41);
    let other = png_bytes(30, 42);
    let archive = build_zip(&[
        ("Winter Anthology/front.png", front.as_slice()),
        ("Winter Anthology/back.png", back.as_slice()),
        ("Foggy Harbor/cover.png", other.as_slice()),
        ("Winter Anthology/notes.txt", b"not an image"),
    ]);

    let response = post_archive(&app, archive).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary: serde_json::Value = response.json().await.expect("Failed to parse response");

    assert_eq!(summary["projects_created"], 2);
    assert_eq!(summary["projects_updated"], 0);
    assert_eq!(summary["versions_created"], 3);
    let skipped = summary["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["name"], "Winter Anthology/notes.txt");
    assert_eq!(skipped[0]["reason"], "not a supported image type");

    // The folders became slugged projects with the uploaded versions
    let client = reqwest::Client::new();
    let project: serde_json::Value = client
        .get(app.api_url("/projects/slug/winter-anthology"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(project["name"], "Winter Anthology");
    assert_eq!(project["versions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn reimport_appends_to_existing_projects() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(media_upload_response("covers/again"))
        .mount(&app.media_mock)
        .await;

    let first = png_bytes(10, 10);
    let archive = build_zip(&[("Reprint/cover.png", first.as_slice())]);

    let response = post_archive(&app, archive).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary: serde_json::Value = response.json().await.unwrap();
    assert_eq!(summary["projects_created"], 1);

    let second = png_bytes(11, 11);
    let archive = build_zip(&[("Reprint/alt.png", second.as_slice())]);

    let response = post_archive(&app, archive).await;
    let summary: serde_json::Value = response.json().await.unwrap();
    assert_eq!(summary["projects_created"], 0);
    assert_eq!(summary["projects_updated"], 1);
    assert_eq!(summary["versions_created"], 1);
}

#[tokio::test]
async fn root_level_files_become_their_own_projects() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(media_upload_response("covers/root"))
        .mount(&app.media_mock)
        .await;

    let bytes = png_bytes(14, 14);
    let archive = build_zip(&[("Lone Lighthouse.png", bytes.as_slice())]);

    let response = post_archive(&app, archive).await;
    let summary: serde_json::Value = response.json().await.unwrap();
    assert_eq!(summary["projects_created"], 1);
    assert_eq!(summary["versions_created"], 1);

    let client = reqwest::Client::new();
    let response = client
        .get(app.api_url("/projects/slug/lone-lighthouse"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_zip_body_is_rejected() {
    let app = spawn_app().await;

    let response = post_archive(&app, b"this is not a zip".to_vec()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn archive_with_no_files_is_rejected() {
    let app = spawn_app().await;

    let archive = build_zip(&[]);
    let response = post_archive(&app, archive).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mid_group_failure_keeps_committed_versions() {
    let app = spawn_app().await;

    // First original upload succeeds, its thumbnail succeeds, the second
    // original upload fails.
    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .and(body_partial_json(serde_json::json!({ "folder": "covers/pair" })))
        .respond_with(media_upload_response("covers/pair-a"))
        .up_to_n_times(1)
        .mount(&app.media_mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .and(body_partial_json(
            serde_json::json!({ "folder": "covers/pair/thumbs" }),
        ))
        .respond_with(media_upload_response("covers/pair-a-thumb"))
        .mount(&app.media_mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.media_mock)
        .await;

    let a = png_bytes(9, 9);
    let b = png_bytes(9, 10);
    let archive = build_zip(&[("Pair/a.png", a.as_slice()), ("Pair/b.png", b.as_slice())]);

    let response = post_archive(&app, archive).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary: serde_json::Value = response.json().await.unwrap();

    // The committed version stays counted; only the files that never made
    // it in are reported as skipped.
    assert_eq!(summary["versions_created"], 1);
    let skipped = summary["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["name"], "Pair/b.png");
    assert!(
        skipped[0]["reason"]
            .as_str()
            .unwrap()
            .contains("group 'Pair' failed")
    );

    let client = reqwest::Client::new();
    let project: serde_json::Value = client
        .get(app.api_url("/projects/slug/pair"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(project["versions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn capped_files_are_skipped_without_uploading() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Any media-host traffic here would mean a capped file was uploaded.
    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(media_upload_response("covers/never"))
        .expect(0)
        .mount(&app.media_mock)
        .await;

    let project: serde_json::Value = client
        .post(app.api_url("/projects"))
        .bearer_auth(&app.auth_token)
        .json(&serde_json::json!({ "name": "Full House" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = project["id"].as_i64().unwrap();

    for n in 1..=20 {
        let response = client
            .post(app.api_url(&format!("/projects/{id}/versions")))
            .bearer_auth(&app.auth_token)
            .json(&serde_json::json!({ "image_url": format!("https://media.test/{n}.png") }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let extra_one = png_bytes(7, 7);
    let extra_two = png_bytes(7, 8);
    let archive = build_zip(&[
        ("Full House/extra-one.png", extra_one.as_slice()),
        ("Full House/extra-two.png", extra_two.as_slice()),
    ]);

    let response = post_archive(&app, archive).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary: serde_json::Value = response.json().await.unwrap();

    assert_eq!(summary["projects_updated"], 1);
    assert_eq!(summary["versions_created"], 0);
    let skipped = summary["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 2);
    for entry in skipped {
        assert!(
            entry["reason"]
                .as_str()
                .unwrap()
                .contains("maximum of 20 versions")
        );
    }
}

#[tokio::test]
async fn failed_group_does_not_abort_other_groups() {
    let app = spawn_app().await;

    // Uploads destined for the "broken" project fail; everything else succeeds.
    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .and(body_partial_json(serde_json::json!({ "folder": "covers/broken" })))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.media_mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/images"))
        .respond_with(media_upload_response("covers/fine"))
        .mount(&app.media_mock)
        .await;

    let a = png_bytes(9, 9);
    let b = png_bytes(9, 10);
    let archive = build_zip(&[
        ("Broken/cover.png", a.as_slice()),
        ("Working/cover.png", b.as_slice()),
    ]);

    let response = post_archive(&app, archive).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary: serde_json::Value = response.json().await.unwrap();

    assert_eq!(summary["versions_created"], 1);
    let skipped = summary["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["name"], "Broken/cover.png");
    assert!(
        skipped[0]["reason"]
            .as_str()
            .unwrap()
            .contains("group 'Broken' failed")
    );

    let client = reqwest::Client::new();
    let response = client
        .get(app.api_url("/projects/slug/working"))
        .bearer_auth(&app.auth_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}
