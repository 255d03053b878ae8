//! Repository for the `archives` table (at most one row per release).

use ims_core::types::DbId;
use sqlx::PgPool;

use crate::models::archive::{Archive, ArchiveFields, ARCHIVE_SCHEMA};
use crate::store::RecordStore;

/// Provides access to release archives.
pub struct ArchiveRepo;

impl ArchiveRepo {
    /// Find the archive of a release.
    pub async fn find_by_release(
        pool: &PgPool,
        release_id: DbId,
    ) -> Result<Option<Archive>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM archives WHERE release_id = $1",
            ARCHIVE_SCHEMA.select_list()
        );
        sqlx::query_as::<_, Archive>(&query)
            .bind(release_id)
            .fetch_optional(pool)
            .await
    }

    /// Load the zip bundle of a release's archive.
    pub async fn find_contents(
        pool: &PgPool,
        release_id: DbId,
    ) -> Result<Option<Vec<u8>>, sqlx::Error> {
        sqlx::query_scalar("SELECT contents FROM archives WHERE release_id = $1")
            .bind(release_id)
            .fetch_optional(pool)
            .await
    }

    /// Store a built archive, share-locking its release (scoped to
    /// `project_id`) for the insert.
    ///
    /// Returns `None` if the release no longer exists. A second archive for
    /// the same release fails on `uq_archives_release_id`.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        fields: &ArchiveFields,
    ) -> Result<Option<Archive>, sqlx::Error> {
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

        let archive = RecordStore::insert(&mut *tx, fields).await?;
        tx.commit().await?;
        Ok(Some(archive))
    }

    /// Delete a release's archive. Returns `true` if one existed.
    pub async fn delete_by_release(pool: &PgPool, release_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM archives WHERE release_id = $1")
            .bind(release_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
