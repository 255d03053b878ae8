//! Generic keyed-table access.
//!
//! A table is described once by a static [`Schema`] (column name, kind and
//! role). Row types implement [`Record`]; write payloads implement
//! [`RecordFields`] and hand over their values in schema order. The store
//! only splices identifiers taken from those static descriptors into SQL;
//! every value travels as a bound parameter.
//!
//! Ids are assigned by the database (`BIGSERIAL`) and never written by the
//! store. `update` and `delete` touch at most one row and report a missing id
//! as `None` / `false` rather than an error; callers turn that into NotFound.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgExecutor, Postgres, QueryBuilder};

use ims_core::types::{DbId, Timestamp};

/// SQL type family of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    BigInt,
    Int,
    Text,
    Bytes,
    BigIntArray,
    Timestamp,
}

/// How the store treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Primary key. Selected, never written.
    Id,
    /// Filled by the database (defaults, triggers). Selected, never written.
    Generated,
    /// Selected and written.
    Writable,
    /// Written but never selected (large blobs, read through dedicated queries).
    WriteOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub role: ColumnRole,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind, role: ColumnRole) -> Self {
        Self { name, kind, role }
    }

    fn is_selected(&self) -> bool {
        !matches!(self.role, ColumnRole::WriteOnly)
    }

    fn is_written(&self) -> bool {
        matches!(self.role, ColumnRole::Writable | ColumnRole::WriteOnly)
    }
}

/// Static description of one table.
#[derive(Debug)]
pub struct Schema {
    pub table: &'static str,
    pub columns: &'static [Column],
}

impl Schema {
    /// Name of the primary key column.
    pub fn id_column(&self) -> &'static str {
        self.columns
            .iter()
            .find(|c| c.role == ColumnRole::Id)
            .map(|c| c.name)
            .unwrap_or("id")
    }

    /// Comma-separated list of selectable columns, for `SELECT` and `RETURNING`.
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .filter(|c| c.is_selected())
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Selectable columns prefixed with a table alias (`p.id, p.name, ...`).
    pub fn select_list_aliased(&self, alias: &str) -> String {
        self.columns
            .iter()
            .filter(|c| c.is_selected())
            .map(|c| format!("{alias}.{}", c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Columns written by `save` / `update`, in schema order.
    pub fn written_columns(&self) -> impl Iterator<Item = &'static Column> {
        self.columns.iter().filter(|c| c.is_written())
    }
}

/// A value bound to one written column.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    BigInt(i64),
    Int(i32),
    Text(&'a str),
    Bytes(&'a [u8]),
    BigIntArray(&'a [i64]),
    Timestamp(Timestamp),
}

impl Value<'_> {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::BigInt(_) => ColumnKind::BigInt,
            Value::Int(_) => ColumnKind::Int,
            Value::Text(_) => ColumnKind::Text,
            Value::Bytes(_) => ColumnKind::Bytes,
            Value::BigIntArray(_) => ColumnKind::BigIntArray,
            Value::Timestamp(_) => ColumnKind::Timestamp,
        }
    }
}

/// A row type stored in the table described by `SCHEMA`.
///
/// The `FromRow` implementation must read exactly the selectable columns.
pub trait Record: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const SCHEMA: &'static Schema;
}

/// A full set of writable values for a [`Record`]'s table.
pub trait RecordFields: Sync {
    type Record: Record;

    /// One value per written column, in schema order.
    fn values(&self) -> Vec<Value<'_>>;
}

/// Check a payload against its schema before any SQL is built.
fn checked_values<F: RecordFields>(fields: &F) -> Result<Vec<(&'static str, Value<'_>)>, sqlx::Error> {
    let schema = F::Record::SCHEMA;
    let values = fields.values();
    let columns: Vec<&'static Column> = schema.written_columns().collect();

    if values.len() != columns.len() {
        return Err(sqlx::Error::Protocol(format!(
            "{}: expected {} values, got {}",
            schema.table,
            columns.len(),
            values.len()
        )));
    }

    columns
        .into_iter()
        .zip(values)
        .map(|(column, value)| {
            if column.kind == value.kind() {
                Ok((column.name, value))
            } else {
                Err(sqlx::Error::Protocol(format!(
                    "{}.{}: expected {:?}, got {:?}",
                    schema.table,
                    column.name,
                    column.kind,
                    value.kind()
                )))
            }
        })
        .collect()
}

fn push_value<'args>(builder: &mut QueryBuilder<'args, Postgres>, value: Value<'args>) {
    match value {
        Value::BigInt(v) => builder.push_bind(v),
        Value::Int(v) => builder.push_bind(v),
        Value::Text(v) => builder.push_bind(v),
        Value::Bytes(v) => builder.push_bind(v),
        Value::BigIntArray(v) => builder.push_bind(v),
        Value::Timestamp(v) => builder.push_bind(v),
    };
}

/// Generic get/save/update/delete over any [`Record`] table.
pub struct RecordStore;

impl RecordStore {
    /// Fetch one row by id.
    pub async fn get<'e, R, E>(executor: E, id: DbId) -> Result<Option<R>, sqlx::Error>
    where
        R: Record,
        E: PgExecutor<'e>,
    {
        let schema = R::SCHEMA;
        let query = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            schema.select_list(),
            schema.table,
            schema.id_column()
        );
        sqlx::query_as::<_, R>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Insert a row and return its store-assigned id.
    pub async fn save<'e, F, E>(executor: E, fields: &F) -> Result<DbId, sqlx::Error>
    where
        F: RecordFields,
        E: PgExecutor<'e>,
    {
        let schema = F::Record::SCHEMA;
        let mut builder = Self::insert_builder(fields)?;
        builder.push(" RETURNING ");
        builder.push(schema.id_column());
        builder.build_query_scalar::<DbId>().fetch_one(executor).await
    }

    /// Insert a row and return it as stored (defaults and triggers applied).
    pub async fn insert<'e, F, E>(executor: E, fields: &F) -> Result<F::Record, sqlx::Error>
    where
        F: RecordFields,
        E: PgExecutor<'e>,
    {
        let schema = F::Record::SCHEMA;
        let mut builder = Self::insert_builder(fields)?;
        builder.push(" RETURNING ");
        builder.push(schema.select_list());
        builder
            .build_query_as::<F::Record>()
            .fetch_one(executor)
            .await
    }

    /// Replace every written column of row `id`.
    ///
    /// Returns `None` when no row has that id.
    pub async fn update<'e, F, E>(
        executor: E,
        id: DbId,
        fields: &F,
    ) -> Result<Option<F::Record>, sqlx::Error>
    where
        F: RecordFields,
        E: PgExecutor<'e>,
    {
        let schema = F::Record::SCHEMA;
        let values = checked_values(fields)?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");
        builder.push(schema.table);
        builder.push(" SET ");
        for (index, (column, value)) in values.into_iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            builder.push(column);
            builder.push(" = ");
            push_value(&mut builder, value);
        }
        builder.push(" WHERE ");
        builder.push(schema.id_column());
        builder.push(" = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(schema.select_list());

        builder
            .build_query_as::<F::Record>()
            .fetch_optional(executor)
            .await
    }

    /// Delete row `id`. Returns `true` if a row was removed.
    pub async fn delete<'e, R, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        R: Record,
        E: PgExecutor<'e>,
    {
        let schema = R::SCHEMA;
        let query = format!(
            "DELETE FROM {} WHERE {} = $1",
            schema.table,
            schema.id_column()
        );
        let result = sqlx::query(&query).bind(id).execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }

    fn insert_builder<F: RecordFields>(fields: &F) -> Result<QueryBuilder<'_, Postgres>, sqlx::Error> {
        let schema = F::Record::SCHEMA;
        let values = checked_values(fields)?;

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
        builder.push(schema.table);
        builder.push(" (");
        builder.push(
            values
                .iter()
                .map(|(column, _)| *column)
                .collect::<Vec<_>>()
                .join(", "),
        );
        builder.push(") VALUES (");
        for (index, (_, value)) in values.into_iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            push_value(&mut builder, value);
        }
        builder.push(")");
        Ok(builder)
    }
}
