use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, query, query_as};

use crate::domain::RepositoryError;
use crate::domain::ids::{ProjectId, UserId};
use crate::domain::listing::{ListRequest, Page};
use crate::domain::projects::{
    CoverProject, NewCoverProject, ProjectSortKey, ProjectWithVersionCount, UpdateCoverProject,
};
use crate::domain::repositories::ProjectRepository;
use crate::domain::slug::slugify;
use crate::infrastructure::database::DatabasePool;
use crate::infrastructure::repositories::macros::push_update_field;
use crate::infrastructure::repositories::pagination::{SearchFilter, paginate};

#[derive(Clone)]
pub struct SqlProjectRepository {
    pool: DatabasePool,
}

impl SqlProjectRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn order_clause(request: &ListRequest<ProjectSortKey>) -> String {
        let dir_sql = request.sort_direction().as_sql();

        match request.sort_key() {
            ProjectSortKey::CreatedAt => format!("p.created_at {dir_sql}, LOWER(p.name) ASC"),
            ProjectSortKey::UpdatedAt => format!("p.updated_at {dir_sql}, LOWER(p.name) ASC"),
            ProjectSortKey::Name => format!("LOWER(p.name) {dir_sql}, p.updated_at DESC"),
        }
    }

    fn into_project(record: ProjectRecord) -> CoverProject {
        CoverProject {
            id: ProjectId::from(record.id),
            user_id: UserId::from(record.user_id),
            name: record.name,
            slug: record.slug,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRecord {
    id: i64,
    user_id: i64,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ProjectCountRecord {
    id: i64,
    user_id: i64,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version_count: i64,
}

const PROJECT_COLUMNS: &str = "id, user_id, name, slug, created_at, updated_at";

#[async_trait]
impl ProjectRepository for SqlProjectRepository {
    async fn insert(&self, new_project: NewCoverProject) -> Result<CoverProject, RepositoryError> {
        let slug = new_project.slug();
        if slug.is_empty() {
            return Err(RepositoryError::validation(
                "project name must contain at least one alphanumeric character",
            ));
        }

        let now = Utc::now();
        let record = query_as::<_, ProjectRecord>(&format!(
            r"INSERT INTO cover_projects (user_id, name, slug, created_at, updated_at)
              VALUES (?, ?, ?, ?, ?)
              RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(i64::from(new_project.user_id))
        .bind(&new_project.name)
        .bind(&slug)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict(format!(
                    "a project with slug '{slug}' already exists"
                ));
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(Self::into_project(record))
    }

    async fn get(&self, user_id: UserId, id: ProjectId) -> Result<CoverProject, RepositoryError> {
        let record = query_as::<_, ProjectRecord>(&format!(
            r"SELECT {PROJECT_COLUMNS} FROM cover_projects WHERE id = ? AND user_id = ?"
        ))
        .bind(i64::from(id))
        .bind(i64::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_project(record))
    }

    async fn get_by_slug(
        &self,
        user_id: UserId,
        slug: &str,
    ) -> Result<CoverProject, RepositoryError> {
        let record = query_as::<_, ProjectRecord>(&format!(
            r"SELECT {PROJECT_COLUMNS} FROM cover_projects WHERE slug = ? AND user_id = ?"
        ))
        .bind(slug)
        .bind(i64::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_project(record))
    }

    async fn list(
        &self,
        user_id: UserId,
        request: &ListRequest<ProjectSortKey>,
        search: Option<&str>,
    ) -> Result<Page<ProjectWithVersionCount>, RepositoryError> {
        let order_clause = Self::order_clause(request);

        let base_query = r"SELECT p.id, p.user_id, p.name, p.slug, p.created_at, p.updated_at,
                 (SELECT COUNT(*) FROM cover_versions v WHERE v.project_id = p.id) AS version_count
              FROM cover_projects p";
        let count_query = "SELECT COUNT(*) FROM cover_projects p";

        let filter = search.and_then(|t| SearchFilter::new(t, vec!["p.name", "p.slug"]));

        paginate(
            &self.pool,
            request,
            base_query,
            count_query,
            &order_clause,
            Some(("p.user_id", i64::from(user_id))),
            filter.as_ref(),
            |r: ProjectCountRecord| ProjectWithVersionCount {
                version_count: r.version_count.max(0) as u32,
                project: Self::into_project(ProjectRecord {
                    id: r.id,
                    user_id: r.user_id,
                    name: r.name,
                    slug: r.slug,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                }),
            },
        )
        .await
    }

    async fn update(
        &self,
        user_id: UserId,
        id: ProjectId,
        changes: UpdateCoverProject,
    ) -> Result<CoverProject, RepositoryError> {
        let Some(name) = changes.name else {
            return Err(RepositoryError::validation("no changes provided"));
        };

        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(RepositoryError::validation(
                "project name must contain at least one alphanumeric character",
            ));
        }

        let mut builder = QueryBuilder::new("UPDATE cover_projects SET ");
        let mut sep = false;
        push_update_field!(builder, sep, "name", Some(name));
        push_update_field!(builder, sep, "slug", Some(slug.clone()));
        push_update_field!(builder, sep, "updated_at", Some(Utc::now()));

        builder.push(" WHERE id = ");
        builder.push_bind(i64::from(id));
        builder.push(" AND user_id = ");
        builder.push_bind(i64::from(user_id));

        let result = builder.build().execute(&self.pool).await.map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict(format!(
                    "a project with slug '{slug}' already exists"
                ));
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(user_id, id).await
    }

    async fn touch(&self, id: ProjectId) -> Result<(), RepositoryError> {
        query(r"UPDATE cover_projects SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(())
    }

    async fn delete(&self, user_id: UserId, id: ProjectId) -> Result<(), RepositoryError> {
        let result = query(r"DELETE FROM cover_projects WHERE id = ? AND user_id = ?")
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
}
