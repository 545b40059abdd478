use anyhow::Result;
use clap::Parser;
use covergen::application::{ServerConfig, serve};
use covergen::infrastructure::client::CovergenClient;
use covergen::presentation::cli::{Cli, Commands, ServeCommand, imports, projects};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Project { command } => {
            let client = CovergenClient::from_base_url(&cli.api_url)?;
            projects::run(&client, command).await
        }
        Commands::Import(cmd) => {
            let client = CovergenClient::from_base_url(&cli.api_url)?;
            imports::run(&client, cmd).await
        }
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let workflow_api_key = command.workflow_api_key.unwrap_or_default();
    let media_host_api_key = command.media_host_api_key.unwrap_or_default();

    if workflow_api_key.is_empty() {
        tracing::warn!("no workflow API key configured - generation requests will be rejected");
    }

    let config = ServerConfig {
        bind_address: command.bind_address,
        database_url: command.database_url,
        workflow_url: command.workflow_url,
        workflow_api_key,
        workflow_id: command.workflow_id,
        media_host_url: command.media_host_url,
        media_host_api_key,
    };

    serve(config).await
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if logging cannot be initialized
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
