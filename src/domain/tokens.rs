use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::ids::{TokenId, UserId};

/// An API token. Only the SHA-256 hash of the raw token is stored; the raw
/// value is shown once at creation time.
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub id: TokenId,
    pub user_id: UserId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewToken {
    pub user_id: UserId,
    pub token_hash: String,
    pub name: String,
}

impl NewToken {
    pub fn new(user_id: UserId, token_hash: String, name: String) -> Self {
        Self {
            user_id,
            token_hash,
            name,
        }
    }
}
