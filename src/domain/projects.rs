use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ProjectId, UserId, VersionId};
use crate::domain::listing::{SortDirection, SortKey};
use crate::domain::slug::slugify;

/// Maximum number of saved versions a single project may hold.
pub const MAX_VERSIONS_PER_PROJECT: u32 = 20;

/// A named, slugged container for cover-generation attempts belonging to
/// one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverProject {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCoverProject {
    pub user_id: UserId,
    pub name: String,
}

impl NewCoverProject {
    pub fn normalize(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }

    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCoverProject {
    pub name: Option<String>,
}

impl UpdateCoverProject {
    pub fn normalize(mut self) -> Self {
        self.name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }
}

/// A project together with its version count, as returned by listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectWithVersionCount {
    #[serde(flatten)]
    pub project: CoverProject,
    pub version_count: u32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProjectSortKey {
    CreatedAt,
    UpdatedAt,
    Name,
}

impl SortKey for ProjectSortKey {
    fn default() -> Self {
        ProjectSortKey::UpdatedAt
    }

    fn from_query(value: &str) -> Option<Self> {
        match value {
            "created-at" => Some(ProjectSortKey::CreatedAt),
            "updated-at" => Some(ProjectSortKey::UpdatedAt),
            "name" => Some(ProjectSortKey::Name),
            _ => None,
        }
    }

    fn query_value(self) -> &'static str {
        match self {
            ProjectSortKey::CreatedAt => "created-at",
            ProjectSortKey::UpdatedAt => "updated-at",
            ProjectSortKey::Name => "name",
        }
    }

    fn default_direction(self) -> SortDirection {
        match self {
            ProjectSortKey::CreatedAt | ProjectSortKey::UpdatedAt => SortDirection::Desc,
            ProjectSortKey::Name => SortDirection::Asc,
        }
    }
}

/// One saved generation outcome under a project, numbered sequentially
/// from 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverVersion {
    pub id: VersionId,
    pub project_id: ProjectId,
    pub version_number: u32,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub source_image_url: Option<String>,
    pub prompt: Option<String>,
    pub provider_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCoverVersion {
    pub project_id: ProjectId,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub source_image_url: Option<String>,
    pub prompt: Option<String>,
    pub provider_task_id: Option<String>,
}

impl NewCoverVersion {
    pub fn normalize(mut self) -> Self {
        self.prompt = self
            .prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }
}
