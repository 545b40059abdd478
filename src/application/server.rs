use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::services::stale_jobs::stale_job_sweep_task;
use crate::application::state::{AppState, AppStateConfig};
use crate::domain::repositories::{TokenRepository, UserRepository};
use crate::domain::tokens::NewToken;
use crate::domain::users::NewUser;
use crate::infrastructure::auth::{generate_token, hash_token};
use crate::infrastructure::database::Database;

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub workflow_url: String,
    pub workflow_api_key: String,
    pub workflow_id: String,
    pub media_host_url: String,
    pub media_host_api_key: String,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            workflow_url: config.workflow_url,
            workflow_api_key: config.workflow_api_key,
            workflow_id: config.workflow_id,
            media_host_url: config.media_host_url,
            media_host_api_key: config.media_host_api_key,
        },
    );

    // Spawn background sweep for jobs stuck in `pending`
    tokio::spawn(stale_job_sweep_task(
        Arc::clone(&state.job_repo),
        std::time::Duration::from_secs(600),
    ));

    // Bootstrap: if no users exist, create an admin user and print a token
    bootstrap_admin(&state.user_repo, &state.token_repo).await?;

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        "starting HTTP server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

async fn bootstrap_admin(
    user_repo: &Arc<dyn UserRepository>,
    token_repo: &Arc<dyn TokenRepository>,
) -> anyhow::Result<()> {
    let users_exist = user_repo
        .exists()
        .await
        .context("failed to check if users exist")?;

    if users_exist {
        return Ok(());
    }

    let user = user_repo
        .insert(NewUser::new("admin"))
        .await
        .context("failed to create admin user")?;

    let raw_token = generate_token();
    let new_token = NewToken::new(user.id, hash_token(&raw_token), "bootstrap".to_string());
    token_repo
        .insert(new_token)
        .await
        .context("failed to create bootstrap token")?;

    info!("No users found. Created 'admin' with API token:");
    info!("  {raw_token}");
    info!("Store it now; only its hash is kept.");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
