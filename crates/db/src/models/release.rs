//! Release entity model and DTOs.

use ims_core::status::ReleaseStatus;
use ims_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::store::{Column, ColumnKind, ColumnRole, Record, RecordFields, Schema, Value};

pub static RELEASE_SCHEMA: Schema = Schema {
    table: "releases",
    columns: &[
        Column::new("id", ColumnKind::BigInt, ColumnRole::Id),
        Column::new("project_id", ColumnKind::BigInt, ColumnRole::Writable),
        Column::new("chapter", ColumnKind::Text, ColumnRole::Writable),
        Column::new("version", ColumnKind::Int, ColumnRole::Writable),
        Column::new("status", ColumnKind::Text, ColumnRole::Writable),
        Column::new("released_on", ColumnKind::Timestamp, ColumnRole::Writable),
        Column::new("created_at", ColumnKind::Timestamp, ColumnRole::Generated),
        Column::new("updated_at", ColumnKind::Timestamp, ColumnRole::Generated),
    ],
};

/// A release row from the `releases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: DbId,
    pub project_id: DbId,
    pub chapter: String,
    pub version: i32,
    #[sqlx(try_from = "String")]
    pub status: ReleaseStatus,
    pub released_on: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Record for Release {
    const SCHEMA: &'static Schema = &RELEASE_SCHEMA;
}

/// Client-supplied release fields for create and replace.
///
/// `version` is accepted as a JSON integer or a numeric string (HTML forms
/// submit strings); range checks happen in the controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInput {
    pub chapter: String,
    #[serde(deserialize_with = "deserialize_version")]
    pub version: i64,
    #[serde(default)]
    pub status: ReleaseStatus,
}

/// Complete row values for an insert or full replace.
#[derive(Debug, Clone)]
pub struct ReleaseFields {
    pub project_id: DbId,
    pub chapter: String,
    pub version: i32,
    pub status: ReleaseStatus,
    pub released_on: Timestamp,
}

impl RecordFields for ReleaseFields {
    type Record = Release;

    fn values(&self) -> Vec<Value<'_>> {
        vec![
            Value::BigInt(self.project_id),
            Value::Text(&self.chapter),
            Value::Int(self.version),
            Value::Text(self.status.as_str()),
            Value::Timestamp(self.released_on),
        ]
    }
}

fn deserialize_version<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match IntOrString::deserialize(deserializer) {
        Ok(IntOrString::Int(v)) => Ok(v),
        Ok(IntOrString::Str(s)) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("version must be an integer, got '{s}'"))
        }),
        Err(_) => Err(serde::de::Error::custom("version must be an integer")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn version_accepts_number_or_numeric_string() {
        let a: ReleaseInput =
            serde_json::from_str(r#"{"chapter": "1", "version": 2}"#).unwrap();
        let b: ReleaseInput =
            serde_json::from_str(r#"{"chapter": "1", "version": "2"}"#).unwrap();
        assert_eq!(a.version, 2);
        assert_eq!(b.version, 2);
        assert_eq!(a.status, ReleaseStatus::Draft);
    }

    #[test]
    fn version_rejects_fractions_and_words() {
        assert!(serde_json::from_str::<ReleaseInput>(r#"{"chapter": "1", "version": 1.5}"#).is_err());
        assert!(serde_json::from_str::<ReleaseInput>(r#"{"chapter": "1", "version": "one"}"#).is_err());
        assert!(serde_json::from_str::<ReleaseInput>(r#"{"chapter": "1"}"#).is_err());
    }

    #[test]
    fn fields_cover_every_written_column() {
        let fields = ReleaseFields {
            project_id: 1,
            chapter: "1".into(),
            version: 1,
            status: ReleaseStatus::Released,
            released_on: Utc::now(),
        };
        let kinds: Vec<_> = fields.values().iter().map(Value::kind).collect();
        let expected: Vec<_> = RELEASE_SCHEMA.written_columns().map(|c| c.kind).collect();
        assert_eq!(kinds, expected);
    }
}
