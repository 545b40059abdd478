use std::io::{Cursor, Write};
use std::sync::Arc;

use covergen::application::routes::app_router;
use covergen::application::state::{AppState, AppStateConfig};
use covergen::domain::ids::UserId;
use covergen::domain::repositories::{
    GalleryRepository, JobRepository, ProjectRepository, TokenRepository, UserRepository,
    VersionRepository,
};
use covergen::domain::tokens::NewToken;
use covergen::domain::users::NewUser;
use covergen::infrastructure::auth::{generate_token, hash_token};
use tokio::net::TcpListener;
use tokio::task::AbortHandle;
use wiremock::MockServer;

pub struct TestApp {
    pub address: String,
    #[allow(dead_code)]
    pub user_id: UserId,
    pub auth_token: String,
    #[allow(dead_code)]
    pub user_repo: Arc<dyn UserRepository>,
    #[allow(dead_code)]
    pub token_repo: Arc<dyn TokenRepository>,
    #[allow(dead_code)]
    pub project_repo: Arc<dyn ProjectRepository>,
    #[allow(dead_code)]
    pub version_repo: Arc<dyn VersionRepository>,
    #[allow(dead_code)]
    pub job_repo: Arc<dyn JobRepository>,
    #[allow(dead_code)]
    pub gallery_repo: Arc<dyn GalleryRepository>,
    pub workflow_mock: MockServer,
    pub media_mock: MockServer,
    server_handle: AbortHandle,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_app() -> TestApp {
    let database = covergen::infrastructure::database::Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    let workflow_mock = MockServer::start().await;
    let media_mock = MockServer::start().await;

    let config = AppStateConfig {
        workflow_url: workflow_mock.uri(),
        workflow_api_key: "test-workflow-key".to_string(),
        workflow_id: "cover-thumbnail".to_string(),
        media_host_url: media_mock.uri(),
        media_host_api_key: "test-media-key".to_string(),
    };

    let state = AppState::from_database(&database, config);

    // Clone repos we need for TestApp before consuming state in the router
    let user_repo = state.user_repo.clone();
    let token_repo = state.token_repo.clone();
    let project_repo = state.project_repo.clone();
    let version_repo = state.version_repo.clone();
    let job_repo = state.job_repo.clone();
    let gallery_repo = state.gallery_repo.clone();

    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");

    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{local_addr}");

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("Server failed to start");
    })
    .abort_handle();

    // Seed a user and an API token for authenticated requests
    let user = user_repo
        .insert(NewUser::new("admin"))
        .await
        .expect("Failed to create test user");

    let raw_token = generate_token();
    token_repo
        .insert(NewToken::new(
            user.id,
            hash_token(&raw_token),
            "test".to_string(),
        ))
        .await
        .expect("Failed to create test token");

    TestApp {
        address,
        user_id: user.id,
        auth_token: raw_token,
        user_repo,
        token_repo,
        project_repo,
        version_repo,
        job_repo,
        gallery_repo,
        workflow_mock,
        media_mock,
        server_handle,
    }
}

/// Encode a small solid-colour PNG for upload tests.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 200]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("failed to encode PNG");
    out
}

/// Build an in-memory ZIP archive from `(path, bytes)` pairs.
pub fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in files {
        writer.start_file(*name, options).expect("start_file failed");
        writer.write_all(bytes).expect("write failed");
    }
    writer.finish().expect("finish failed").into_inner()
}

/// Canned media-host upload response.
pub fn media_upload_response(public_id: &str) -> wiremock::ResponseTemplate {
    wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "url": format!("https://media.test/{public_id}.png"),
        "public_id": public_id,
        "width": 64,
        "height": 64,
        "bytes": 1024,
        "format": "png"
    }))
}

/// Canned workflow-run response with a single output.
pub fn workflow_run_response(task_id: &str, output_url: &str) -> wiremock::ResponseTemplate {
    wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "task_id": task_id,
        "status": "succeeded",
        "outputs": [{"url": output_url, "content_type": "image/png"}],
        "credits": 3
    }))
}
