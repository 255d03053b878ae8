//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the selectable columns
//! - The table's static [`Schema`](crate::store::Schema)
//! - A write payload implementing [`RecordFields`](crate::store::RecordFields)

pub mod archive;
pub mod page;
pub mod project;
pub mod release;

use serde::Serialize;

/// Descendant rows removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSummary {
    pub releases: i64,
    pub pages: i64,
    pub archives: i64,
}
