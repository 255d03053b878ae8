//! Wire types for API requests and responses (camelCase JSON).

use chrono::{DateTime, Utc};
use ims_core::page_image::PageMimeType;
use ims_core::status::{ProjectStatus, ReleaseStatus};
use ims_core::types::DbId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub project_name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: DbId,
    pub name: String,
    pub project_name: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

/// Body for project create and full replace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub project_name: String,
    pub description: String,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: DbId,
    pub project_id: DbId,
    pub chapter: String,
    pub version: i32,
    pub status: ReleaseStatus,
    pub released_on: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for release create and full replace.
#[derive(Debug, Clone, Serialize)]
pub struct NewRelease {
    pub chapter: String,
    pub version: i32,
    pub status: ReleaseStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: DbId,
    pub release_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: PageMimeType,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for page upload and replace. `data` is base64.
#[derive(Debug, Clone, Serialize)]
pub struct NewPage<'a> {
    pub name: &'a str,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    pub id: DbId,
    pub release_id: DbId,
    pub page_ids: Vec<DbId>,
    pub size: i64,
    pub bundle_size: i64,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArchive<'a> {
    pub page_ids: &'a [DbId],
}

/// Descendants removed by a project or release delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CascadeSummary {
    pub releases: i64,
    pub pages: i64,
    pub archives: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub db_healthy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_reads_type_field() {
        let page: Page = serde_json::from_str(
            r#"{"id":1,"releaseId":2,"name":"001","type":"image/jpeg","size":10,
                "width":3,"height":4,"checksum":"ab",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(page.mime_type, PageMimeType::Jpeg);
        assert_eq!(page.release_id, 2);
    }

    #[test]
    fn new_archive_serializes_camel_case() {
        let body = serde_json::to_value(NewArchive { page_ids: &[3, 1] }).unwrap();
        assert_eq!(body, serde_json::json!({"pageIds": [3, 1]}));
    }
}
