use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::UserRepository;
use crate::domain::users::{NewUser, User};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlUserRepository {
    pool: DatabasePool,
}

impl SqlUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: UserRecord) -> User {
        User {
            id: UserId::from(record.id),
            username: record.username,
            created_at: record.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn insert(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            r"INSERT INTO users (username, created_at) VALUES (?, ?)
              RETURNING id, username, created_at",
        )
        .bind(&new_user.username)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict("A user with this username already exists");
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(Self::into_domain(record))
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let record =
            query_as::<_, UserRecord>(r"SELECT id, username, created_at FROM users WHERE id = ?")
                .bind(i64::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?
                .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_domain(record))
    }

    async fn exists(&self) -> Result<bool, RepositoryError> {
        let row: (i64,) = query_as(r"SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(row.0 > 0)
    }
}
