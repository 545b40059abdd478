use anyhow::Result;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::ids::ProjectId;
use crate::infrastructure::client::CovergenClient;

#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// List cover projects
    List(ListProjectsCommand),
    /// Delete a project and its versions
    Delete(DeleteProjectCommand),
}

pub async fn run(client: &CovergenClient, cmd: ProjectCommands) -> Result<()> {
    match cmd {
        ProjectCommands::List(c) => list_projects(client, c).await,
        ProjectCommands::Delete(c) => delete_project(client, c).await,
    }
}

#[derive(Debug, Args)]
pub struct ListProjectsCommand {
    /// Filter by name or slug
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
}

pub async fn list_projects(client: &CovergenClient, command: ListProjectsCommand) -> Result<()> {
    let page = client
        .projects()
        .list(command.search.as_deref(), command.page)
        .await?;
    print_json(&page)
}

#[derive(Debug, Args)]
pub struct DeleteProjectCommand {
    #[arg(long)]
    pub id: i64,
}

pub async fn delete_project(client: &CovergenClient, command: DeleteProjectCommand) -> Result<()> {
    client.projects().delete(ProjectId::new(command.id)).await?;
    eprintln!("Deleted project {}.", command.id);
    Ok(())
}
