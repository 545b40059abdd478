use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{JobId, UserId};
use crate::domain::listing::{SortDirection, SortKey};

/// A single request/response cycle against the external image-generation
/// workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailJob {
    pub id: JobId,
    pub user_id: UserId,
    pub prompt: String,
    pub source_image_url: Option<String>,
    pub status: JobStatus,
    pub result_image_url: Option<String>,
    pub error: Option<String>,
    pub provider_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "succeeded" => Ok(JobStatus::Succeeded),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewThumbnailJob {
    pub user_id: UserId,
    pub prompt: String,
    pub source_image_url: Option<String>,
}

impl NewThumbnailJob {
    pub fn normalize(mut self) -> Self {
        self.prompt = self.prompt.trim().to_string();
        self.source_image_url = self
            .source_image_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        self
    }
}

/// Terminal outcome written back onto a pending job row.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Succeeded {
        result_image_url: String,
        provider_task_id: Option<String>,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JobSortKey {
    CreatedAt,
}

impl SortKey for JobSortKey {
    fn default() -> Self {
        JobSortKey::CreatedAt
    }

    fn from_query(value: &str) -> Option<Self> {
        match value {
            "created-at" => Some(JobSortKey::CreatedAt),
            _ => None,
        }
    }

    fn query_value(self) -> &'static str {
        "created-at"
    }

    fn default_direction(self) -> SortDirection {
        SortDirection::Desc
    }
}
