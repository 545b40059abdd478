pub mod imports;
pub mod projects;

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use imports::ImportCommand;
use projects::ProjectCommands;

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate, version, and organize cover images", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "COVERGEN_URL",
        default_value = "http://localhost:3000"
    )]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Manage cover projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Batch-import a ZIP archive of cover images
    Import(ImportCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "COVERGEN_DATABASE_URL",
        default_value = "sqlite://covergen.db"
    )]
    pub database_url: String,

    #[arg(long, env = "COVERGEN_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    #[arg(
        long,
        env = "COVERGEN_WORKFLOW_URL",
        default_value = "https://workflows.example.com"
    )]
    pub workflow_url: String,

    #[arg(long, env = "COVERGEN_WORKFLOW_API_KEY")]
    pub workflow_api_key: Option<String>,

    #[arg(long, env = "COVERGEN_WORKFLOW_ID", default_value = "cover-thumbnail")]
    pub workflow_id: String,

    #[arg(
        long,
        env = "COVERGEN_MEDIA_HOST_URL",
        default_value = "https://media.example.com"
    )]
    pub media_host_url: String,

    #[arg(long, env = "COVERGEN_MEDIA_HOST_API_KEY")]
    pub media_host_api_key: Option<String>,
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
