//! Archive entity model and DTOs.

use ims_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::store::{Column, ColumnKind, ColumnRole, Record, RecordFields, Schema, Value};

pub static ARCHIVE_SCHEMA: Schema = Schema {
    table: "archives",
    columns: &[
        Column::new("id", ColumnKind::BigInt, ColumnRole::Id),
        Column::new("release_id", ColumnKind::BigInt, ColumnRole::Writable),
        Column::new("page_ids", ColumnKind::BigIntArray, ColumnRole::Writable),
        Column::new("size", ColumnKind::BigInt, ColumnRole::Writable),
        Column::new("bundle_size", ColumnKind::BigInt, ColumnRole::Writable),
        Column::new("checksum", ColumnKind::Text, ColumnRole::Writable),
        Column::new("contents", ColumnKind::Bytes, ColumnRole::WriteOnly),
        Column::new("created_at", ColumnKind::Timestamp, ColumnRole::Generated),
    ],
};

/// Archive metadata from the `archives` table (no bundle bytes).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    pub id: DbId,
    pub release_id: DbId,
    /// Pages in bundle order.
    pub page_ids: Vec<DbId>,
    /// Sum of the bundled page sizes.
    pub size: i64,
    /// Byte length of the zip bundle.
    pub bundle_size: i64,
    /// SHA-256 of the zip bundle.
    pub checksum: String,
    pub created_at: Timestamp,
}

impl Record for Archive {
    const SCHEMA: &'static Schema = &ARCHIVE_SCHEMA;
}

/// Request body for `POST .../archive`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArchive {
    pub page_ids: Vec<DbId>,
}

/// Complete row values for an archive insert.
#[derive(Debug, Clone)]
pub struct ArchiveFields {
    pub release_id: DbId,
    pub page_ids: Vec<DbId>,
    pub size: i64,
    pub bundle_size: i64,
    pub checksum: String,
    pub contents: Vec<u8>,
}

impl RecordFields for ArchiveFields {
    type Record = Archive;

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::BigInt(self.release_id),
            Value::BigIntArray(&self.page_ids),
            Value::BigInt(self.size),
            Value::BigInt(self.bundle_size),
            Value::Text(&self.checksum),
            Value::Bytes(&self.contents),
        ]
    }
}
