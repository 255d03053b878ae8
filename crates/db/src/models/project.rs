//! Project entity model and DTOs.

use ims_core::status::ProjectStatus;
use ims_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::store::{Column, ColumnKind, ColumnRole, Record, RecordFields, Schema, Value};

pub static PROJECT_SCHEMA: Schema = Schema {
    table: "projects",
    columns: &[
        Column::new("id", ColumnKind::BigInt, ColumnRole::Id),
        Column::new("name", ColumnKind::Text, ColumnRole::Writable),
        Column::new("project_name", ColumnKind::Text, ColumnRole::Writable),
        Column::new("description", ColumnKind::Text, ColumnRole::Writable),
        Column::new("status", ColumnKind::Text, ColumnRole::Writable),
        Column::new("created_at", ColumnKind::Timestamp, ColumnRole::Generated),
        Column::new("updated_at", ColumnKind::Timestamp, ColumnRole::Generated),
    ],
};

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub name: String,
    /// Unique slug, also used in download paths and archive names.
    pub project_name: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Record for Project {
    const SCHEMA: &'static Schema = &PROJECT_SCHEMA;
}

/// Listing view of a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: DbId,
    pub name: String,
    pub project_name: String,
    pub status: ProjectStatus,
    pub created_at: Timestamp,
}

impl From<Project> for ProjectSummary {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            project_name: project.project_name,
            status: project.status,
            created_at: project.created_at,
        }
    }
}

/// Full set of client-supplied project fields, used by both create and
/// replace. Omitted optional fields reset to their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    pub project_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl RecordFields for ProjectInput {
    type Record = Project;

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::Text(&self.name),
            Value::Text(&self.project_name),
            Value::Text(&self.description),
            Value::Text(self.status.as_str()),
        ]
    }
}
