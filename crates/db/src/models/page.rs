//! Page entity model and DTOs.
//!
//! Image bytes live in the `contents` column, which the generic store writes
//! but never selects; [`PageBlob`] is the row shape for reading them back.

use ims_core::page_image::{DecodedPage, PageMimeType};
use ims_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::store::{Column, ColumnKind, ColumnRole, Record, RecordFields, Schema, Value};

pub static PAGE_SCHEMA: Schema = Schema {
    table: "pages",
    columns: &[
        Column::new("id", ColumnKind::BigInt, ColumnRole::Id),
        Column::new("release_id", ColumnKind::BigInt, ColumnRole::Writable),
        Column::new("name", ColumnKind::Text, ColumnRole::Writable),
        Column::new("mime_type", ColumnKind::Text, ColumnRole::Writable),
        Column::new("size", ColumnKind::BigInt, ColumnRole::Writable),
        Column::new("width", ColumnKind::Int, ColumnRole::Writable),
        Column::new("height", ColumnKind::Int, ColumnRole::Writable),
        Column::new("checksum", ColumnKind::Text, ColumnRole::Writable),
        Column::new("contents", ColumnKind::Bytes, ColumnRole::WriteOnly),
        Column::new("created_at", ColumnKind::Timestamp, ColumnRole::Generated),
        Column::new("updated_at", ColumnKind::Timestamp, ColumnRole::Generated),
    ],
};

/// Page metadata from the `pages` table (no image bytes).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: DbId,
    pub release_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub mime_type: PageMimeType,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub checksum: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Record for Page {
    const SCHEMA: &'static Schema = &PAGE_SCHEMA;
}

/// Upload body for create and replace: a page name and base64 image data.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInput {
    #[serde(alias = "page")]
    pub name: String,
    pub data: String,
}

/// Complete row values for an insert or full replace.
#[derive(Debug, Clone)]
pub struct PageFields {
    pub release_id: DbId,
    pub name: String,
    pub mime_type: PageMimeType,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub checksum: String,
    pub contents: Vec<u8>,
}

impl PageFields {
    /// Build row values from a decoded upload.
    pub fn from_decoded(release_id: DbId, name: String, decoded: DecodedPage) -> Self {
        Self {
            release_id,
            name,
            mime_type: decoded.mime_type,
            size: decoded.size(),
            width: i32::try_from(decoded.width).unwrap_or(i32::MAX),
            height: i32::try_from(decoded.height).unwrap_or(i32::MAX),
            checksum: decoded.checksum,
            contents: decoded.bytes,
        }
    }
}

impl RecordFields for PageFields {
    type Record = Page;

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::BigInt(self.release_id),
            Value::Text(&self.name),
            Value::Text(self.mime_type.as_str()),
            Value::BigInt(self.size),
            Value::Int(self.width),
            Value::Int(self.height),
            Value::Text(&self.checksum),
            Value::Bytes(&self.contents),
        ]
    }
}

/// A page's stored image bytes with the metadata needed to serve or bundle them.
#[derive(Debug, Clone, FromRow)]
pub struct PageBlob {
    pub id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub mime_type: PageMimeType,
    pub contents: Vec<u8>,
}
