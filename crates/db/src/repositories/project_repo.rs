//! Repository for the `projects` table.

use ims_core::listing::ListOrder;
use ims_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{Project, ProjectInput, PROJECT_SCHEMA};
use crate::models::CascadeSummary;
use crate::store::RecordStore;

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &ProjectInput) -> Result<Project, sqlx::Error> {
        RecordStore::insert(pool, input).await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        RecordStore::get::<Project, _>(pool, id).await
    }

    /// Find a project by its slug (`project_name`).
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects WHERE project_name = $1",
            PROJECT_SCHEMA.select_list()
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all projects by creation time.
    pub async fn list(pool: &PgPool, order: ListOrder) -> Result<Vec<Project>, sqlx::Error> {
        let dir = order.sql_direction();
        let query = format!(
            "SELECT {} FROM projects ORDER BY created_at {dir}, id {dir}",
            PROJECT_SCHEMA.select_list()
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Replace every client-writable field of a project.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProjectInput,
    ) -> Result<Option<Project>, sqlx::Error> {
        RecordStore::update(pool, id, input).await
    }

    /// Delete a project and everything under it in one transaction.
    ///
    /// The project and its releases are locked before counting, so the
    /// summary matches what the cascade removes. Returns `None` if no row
    /// with the given `id` exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<CascadeSummary>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        sqlx::query("SELECT id FROM releases WHERE project_id = $1 FOR UPDATE")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let summary = sqlx::query_as::<_, CascadeSummary>(
            "SELECT \
                (SELECT COUNT(*) FROM releases WHERE project_id = $1) AS releases, \
                (SELECT COUNT(*) FROM pages p JOIN releases r ON r.id = p.release_id \
                  WHERE r.project_id = $1) AS pages, \
                (SELECT COUNT(*) FROM archives a JOIN releases r ON r.id = a.release_id \
                  WHERE r.project_id = $1) AS archives",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        RecordStore::delete::<Project, _>(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(Some(summary))
    }
}
