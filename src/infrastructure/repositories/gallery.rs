use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as};

use crate::domain::RepositoryError;
use crate::domain::gallery::{GalleryImage, GallerySortKey, ImageSource, NewGalleryImage};
use crate::domain::ids::{GalleryImageId, UserId};
use crate::domain::listing::{ListRequest, Page};
use crate::domain::repositories::GalleryRepository;
use crate::infrastructure::database::DatabasePool;
use crate::infrastructure::repositories::pagination::{SearchFilter, paginate};

#[derive(Clone)]
pub struct SqlGalleryRepository {
    pool: DatabasePool,
}

impl SqlGalleryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: GalleryRecord) -> GalleryImage {
        GalleryImage {
            id: GalleryImageId::from(record.id),
            user_id: UserId::from(record.user_id),
            checksum: record.checksum,
            content_type: record.content_type,
            byte_size: record.byte_size,
            width: record.width.max(0) as u32,
            height: record.height.max(0) as u32,
            url: record.url,
            host_public_id: record.host_public_id,
            source: ImageSource::from_str(&record.source).unwrap_or_default(),
            created_at: record.created_at,
        }
    }

    fn order_clause(request: &ListRequest<GallerySortKey>) -> String {
        let dir_sql = request.sort_direction().as_sql();
        match request.sort_key() {
            GallerySortKey::CreatedAt => format!("g.created_at {dir_sql}"),
            GallerySortKey::ByteSize => format!("g.byte_size {dir_sql}, g.created_at DESC"),
        }
    }
}

#[derive(sqlx::FromRow)]
struct GalleryRecord {
    id: i64,
    user_id: i64,
    checksum: String,
    content_type: String,
    byte_size: i64,
    width: i64,
    height: i64,
    url: String,
    host_public_id: String,
    source: String,
    created_at: DateTime<Utc>,
}

const GALLERY_COLUMNS: &str = "id, user_id, checksum, content_type, byte_size, width, height, \
                               url, host_public_id, source, created_at";

#[async_trait]
impl GalleryRepository for SqlGalleryRepository {
    async fn insert(&self, new_image: NewGalleryImage) -> Result<GalleryImage, RepositoryError> {
        let record = query_as::<_, GalleryRecord>(&format!(
            r"INSERT INTO gallery_images
                  (user_id, checksum, content_type, byte_size, width, height, url,
                   host_public_id, source, created_at)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
              RETURNING {GALLERY_COLUMNS}"
        ))
        .bind(i64::from(new_image.user_id))
        .bind(&new_image.checksum)
        .bind(&new_image.content_type)
        .bind(new_image.byte_size)
        .bind(i64::from(new_image.width))
        .bind(i64::from(new_image.height))
        .bind(&new_image.url)
        .bind(&new_image.host_public_id)
        .bind(new_image.source.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict("an identical image already exists");
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(Self::into_domain(record))
    }

    async fn get(
        &self,
        user_id: UserId,
        id: GalleryImageId,
    ) -> Result<GalleryImage, RepositoryError> {
        let record = query_as::<_, GalleryRecord>(&format!(
            r"SELECT {GALLERY_COLUMNS} FROM gallery_images WHERE id = ? AND user_id = ?"
        ))
        .bind(i64::from(id))
        .bind(i64::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_domain(record))
    }

    async fn get_by_checksum(
        &self,
        user_id: UserId,
        checksum: &str,
    ) -> Result<GalleryImage, RepositoryError> {
        let record = query_as::<_, GalleryRecord>(&format!(
            r"SELECT {GALLERY_COLUMNS} FROM gallery_images WHERE checksum = ? AND user_id = ?"
        ))
        .bind(checksum)
        .bind(i64::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_domain(record))
    }

    async fn list(
        &self,
        user_id: UserId,
        request: &ListRequest<GallerySortKey>,
        search: Option<&str>,
    ) -> Result<Page<GalleryImage>, RepositoryError> {
        let order_clause = Self::order_clause(request);

        let base_query = "SELECT g.id, g.user_id, g.checksum, g.content_type, g.byte_size, \
                          g.width, g.height, g.url, g.host_public_id, g.source, g.created_at \
                          FROM gallery_images g";
        let count_query = "SELECT COUNT(*) FROM gallery_images g";

        let filter = search.and_then(|t| SearchFilter::new(t, vec!["g.content_type", "g.source"]));

        paginate(
            &self.pool,
            request,
            base_query,
            count_query,
            &order_clause,
            Some(("g.user_id", i64::from(user_id))),
            filter.as_ref(),
            Self::into_domain,
        )
        .await
    }

    async fn delete(&self, user_id: UserId, id: GalleryImageId) -> Result<(), RepositoryError> {
        let result = query(r"DELETE FROM gallery_images WHERE id = ? AND user_id = ?")
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
