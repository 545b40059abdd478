use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

use crate::domain::RepositoryError;
use crate::domain::ids::{TokenId, UserId};
use crate::domain::repositories::TokenRepository;
use crate::domain::tokens::{NewToken, Token};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlTokenRepository {
    pool: DatabasePool,
}

impl SqlTokenRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: TokenRecord) -> Token {
        Token {
            id: TokenId::from(record.id),
            user_id: UserId::from(record.user_id),
            token_hash: record.token_hash,
            name: record.name,
            created_at: record.created_at,
            last_used_at: record.last_used_at,
            revoked_at: record.revoked_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TokenRecord {
    id: i64,
    user_id: i64,
    token_hash: String,
    name: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

const TOKEN_COLUMNS: &str = "id, user_id, token_hash, name, created_at, last_used_at, revoked_at";

#[async_trait]
impl TokenRepository for SqlTokenRepository {
    async fn insert(&self, new_token: NewToken) -> Result<Token, RepositoryError> {
        let record = query_as::<_, TokenRecord>(&format!(
            r"INSERT INTO tokens (user_id, token_hash, name, created_at)
              VALUES (?, ?, ?, ?)
              RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(i64::from(new_token.user_id))
        .bind(&new_token.token_hash)
        .bind(&new_token.name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(Self::into_domain(record))
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Token, RepositoryError> {
        let record = query_as::<_, TokenRecord>(&format!(
            r"SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_hash = ?"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_domain(record))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Token>, RepositoryError> {
        let records = query_as::<_, TokenRecord>(&format!(
            r"SELECT {TOKEN_COLUMNS} FROM tokens WHERE user_id = ? ORDER BY created_at DESC"
        ))
        .bind(i64::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Self::into_domain).collect())
    }

    async fn revoke(&self, user_id: UserId, id: TokenId) -> Result<(), RepositoryError> {
        let result = query(
            r"UPDATE tokens SET revoked_at = ? WHERE id = ? AND user_id = ? AND revoked_at IS NULL",
        )
        .bind(Utc::now())
        .bind(i64::from(id))
        .bind(i64::from(user_id))
        .execute(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn update_last_used(&self, id: TokenId) -> Result<(), RepositoryError> {
        query(r"UPDATE tokens SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(())
    }
}
