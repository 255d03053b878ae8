//! Repository for the `releases` table.

use ims_core::listing::ListOrder;
use ims_core::types::DbId;
use sqlx::PgPool;

use crate::models::release::{Release, ReleaseFields, RELEASE_SCHEMA};
use crate::models::CascadeSummary;
use crate::store::RecordStore;

/// Provides CRUD operations for releases, always scoped to a project.
pub struct ReleaseRepo;

impl ReleaseRepo {
    /// Insert a release under `fields.project_id`.
    ///
    /// The project row is share-locked for the insert, so a concurrent
    /// project delete either waits for this insert or has already removed
    /// the project. Returns `None` if the project does not exist.
    pub async fn create(
        pool: &PgPool,
        fields: &ReleaseFields,
    ) -> Result<Option<Release>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let parent: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM projects WHERE id = $1 FOR SHARE")
                .bind(fields.project_id)
                .fetch_optional(&mut *tx)
                .await?;
        if parent.is_none() {
            return Ok(None);
        }

        let release = RecordStore::insert(&mut *tx, fields).await?;
        tx.commit().await?;
        Ok(Some(release))
    }

    /// Find a release by ID, only if it belongs to `project_id`.
    pub async fn find_scoped(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Release>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM releases WHERE id = $1 AND project_id = $2",
            RELEASE_SCHEMA.select_list()
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's releases by release date.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        order: ListOrder,
    ) -> Result<Vec<Release>, sqlx::Error> {
        let dir = order.sql_direction();
        let query = format!(
            "SELECT {} FROM releases WHERE project_id = $1 \
             ORDER BY released_on {dir}, id {dir}",
            RELEASE_SCHEMA.select_list()
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Find a release by project slug, chapter and version.
    pub async fn find_by_key(
        pool: &PgPool,
        project_slug: &str,
        chapter: &str,
        version: i32,
    ) -> Result<Option<Release>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM releases r JOIN projects p ON p.id = r.project_id \
             WHERE p.project_name = $1 AND r.chapter = $2 AND r.version = $3",
            RELEASE_SCHEMA.select_list_aliased("r")
        );
        sqlx::query_as::<_, Release>(&query)
            .bind(project_slug)
            .bind(chapter)
            .bind(version)
            .fetch_optional(pool)
            .await
    }

    /// Replace a release's fields. `fields.project_id` must be the owning
    /// project; a release of another project is reported as `None`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        fields: &ReleaseFields,
    ) -> Result<Option<Release>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owned: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM releases WHERE id = $1 AND project_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(fields.project_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(None);
        }

        let release = RecordStore::update(&mut *tx, id, fields).await?;
        tx.commit().await?;
        Ok(release)
    }

    /// Delete a release with its pages and archive in one transaction.
    ///
    /// Returns `None` if the release does not exist under `project_id`.
    pub async fn delete(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<CascadeSummary>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM releases WHERE id = $1 AND project_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let summary = sqlx::query_as::<_, CascadeSummary>(
            "SELECT 1::BIGINT AS releases, \
                (SELECT COUNT(*) FROM pages WHERE release_id = $1) AS pages, \
                (SELECT COUNT(*) FROM archives WHERE release_id = $1) AS archives",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        RecordStore::delete::<Release, _>(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(Some(summary))
    }
}
