use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::UserId;

/// One logged call to an external service (workflow provider or media
/// host). Written fire-and-forget; failures never affect the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLog {
    pub id: i64,
    pub user_id: UserId,
    pub provider: String,
    pub endpoint: String,
    pub status: String,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRequestLog {
    pub user_id: UserId,
    pub provider: String,
    pub endpoint: String,
    pub status: String,
    pub duration_ms: i64,
}
