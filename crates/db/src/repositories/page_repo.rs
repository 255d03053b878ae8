//! Repository for the `pages` table.

use ims_core::types::DbId;
use sqlx::PgPool;

use crate::models::page::{Page, PageBlob, PageFields, PAGE_SCHEMA};
use crate::store::RecordStore;

const BLOB_COLUMNS: &str = "id, name, mime_type, contents";

/// Provides CRUD operations for pages, always scoped to a release.
pub struct PageRepo;

impl PageRepo {
    /// Insert a page under `fields.release_id`, share-locking the release
    /// (scoped to `project_id`) for the insert.
    ///
    /// Returns `None` if the release does not exist under that project.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        fields: &PageFields,
    ) -> Result<Option<Page>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let parent: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM releases WHERE id = $1 AND project_id = $2 FOR SHARE",
        )
        .bind(fields.release_id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
        if parent.is_none() {
            return Ok(None);
        }

        let page = RecordStore::insert(&mut *tx, fields).await?;
        tx.commit().await?;
        Ok(Some(page))
    }

    /// Find a page by ID, only if it belongs to `release_id`.
    pub async fn find_scoped(
        pool: &PgPool,
        release_id: DbId,
        id: DbId,
    ) -> Result<Option<Page>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM pages WHERE id = $1 AND release_id = $2",
            PAGE_SCHEMA.select_list()
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .bind(release_id)
            .fetch_optional(pool)
            .await
    }

    /// List a release's pages in upload order.
    pub async fn list_by_release(pool: &PgPool, release_id: DbId) -> Result<Vec<Page>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM pages WHERE release_id = $1 ORDER BY id ASC",
            PAGE_SCHEMA.select_list()
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(release_id)
            .fetch_all(pool)
            .await
    }

    /// Replace a page's name and contents.
    ///
    /// Returns `None` if the page does not belong to `fields.release_id`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        fields: &PageFields,
    ) -> Result<Option<Page>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owned: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM pages WHERE id = $1 AND release_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(fields.release_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(None);
        }

        let page = RecordStore::update(&mut *tx, id, fields).await?;
        tx.commit().await?;
        Ok(page)
    }

    /// Delete a page. Returns `true` if it existed under `release_id`.
    pub async fn delete(pool: &PgPool, release_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1 AND release_id = $2")
            .bind(id)
            .bind(release_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load one page's stored bytes.
    pub async fn find_blob(
        pool: &PgPool,
        release_id: DbId,
        id: DbId,
    ) -> Result<Option<PageBlob>, sqlx::Error> {
        let query =
            format!("SELECT {BLOB_COLUMNS} FROM pages WHERE id = $1 AND release_id = $2");
        sqlx::query_as::<_, PageBlob>(&query)
            .bind(id)
            .bind(release_id)
            .fetch_optional(pool)
            .await
    }

    /// Load the stored bytes of every listed page that belongs to
    /// `release_id`. Ids from other releases are silently skipped; callers
    /// compare the result length with the request.
    pub async fn find_blobs(
        pool: &PgPool,
        release_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<PageBlob>, sqlx::Error> {
        let query = format!(
            "SELECT {BLOB_COLUMNS} FROM pages WHERE release_id = $1 AND id = ANY($2) ORDER BY id"
        );
        sqlx::query_as::<_, PageBlob>(&query)
            .bind(release_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Find a page's bytes by name within a release. A page stored with the
    /// full file name (`001.png`) wins over one stored with the stem (`001`).
    pub async fn find_blob_by_name(
        pool: &PgPool,
        release_id: DbId,
        stem: &str,
        file_name: &str,
    ) -> Result<Option<PageBlob>, sqlx::Error> {
        let query = format!(
            "SELECT {BLOB_COLUMNS} FROM pages \
             WHERE release_id = $1 AND (name = $2 OR name = $3) \
             ORDER BY (name = $3) DESC LIMIT 1"
        );
        sqlx::query_as::<_, PageBlob>(&query)
            .bind(release_id)
            .bind(stem)
            .bind(file_name)
            .fetch_optional(pool)
            .await
    }
}
