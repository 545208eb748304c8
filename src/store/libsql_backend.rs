//! libSQL backend: `DocumentStore` over a local libSQL database.
//!
//! Every document is one row in `documents`, with its fields stored as a JSON
//! object. Equality filters are pushed down with `json_extract`; ordering and
//! limits go through `store::query` so this backend orders exactly like the
//! in-memory one.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use super::migrations;
use super::query;
use super::traits::{Document, DocumentStore, Fields, Query, WriteOp, merge_fields};
use crate::error::StoreError;

/// libSQL document store.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Connection(format!("Failed to create database directory: {e}"))
                })?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db).await?;
        info!(path = %path.display(), "Document store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        migrations::run_migrations(&self.conn).await
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// JSON path for a top-level field, quoted so any key is addressable.
fn field_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}

/// SQL expression extracting `field` from the stored fields.
///
/// Plain identifiers are inlined as `'$.field'` so the expression matches the
/// expression indexes in `migrations`; other keys bind a quoted path as a
/// parameter.
fn field_expr(field: &str, values: &mut Vec<libsql::Value>) -> String {
    let plain = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("json_extract(fields, '$.{field}')")
    } else {
        values.push(libsql::Value::Text(field_path(field)));
        format!("json_extract(fields, ?{})", values.len())
    }
}

/// Build the filter SQL and parameters for a query.
fn query_sql(q: &Query) -> Result<(String, Vec<libsql::Value>), StoreError> {
    let mut sql = String::from("SELECT id, fields FROM documents WHERE collection = ?1");
    let mut values: Vec<libsql::Value> = vec![libsql::Value::Text(q.collection.clone())];

    for (field, expected) in &q.filters {
        let expr = field_expr(field, &mut values);
        values.push(libsql::Value::Text(serde_json::to_string(expected)?));
        sql.push_str(&format!(
            " AND {expr} IS json_extract(?{}, '$')",
            values.len()
        ));
    }
    Ok((sql, values))
}

fn parse_fields(raw: &str) -> Result<Fields, StoreError> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "stored document is not an object: {other}"
        ))),
    }
}

fn encode_fields(fields: &Fields) -> Result<String, StoreError> {
    Ok(serde_json::to_string(fields)?)
}

/// Read the current fields of a document through `conn`.
async fn load_fields(
    conn: &Connection,
    collection: &str,
    id: &str,
) -> Result<Option<Fields>, StoreError> {
    let mut rows = conn
        .query(
            "SELECT fields FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )
        .await
        .map_err(|e| StoreError::Query(format!("get: {e}")))?;

    match rows.next().await {
        Ok(Some(row)) => {
            let raw: String = row
                .get(0)
                .map_err(|e| StoreError::Query(format!("get: {e}")))?;
            Ok(Some(parse_fields(&raw)?))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(StoreError::Query(format!("get: {e}"))),
    }
}

/// Upsert the merged fields of a document through `conn`.
async fn write_fields(
    conn: &Connection,
    collection: &str,
    id: &str,
    fields: &Fields,
) -> Result<(), StoreError> {
    let now = Utc::now().to_rfc3339();
    let raw = encode_fields(fields)?;
    conn.execute(
        "INSERT INTO documents (collection, id, fields, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT (collection, id) DO UPDATE SET fields = ?3, updated_at = ?4",
        params![collection, id, raw, now],
    )
    .await
    .map_err(|e| StoreError::Query(format!("write: {e}")))?;
    Ok(())
}

/// Merge `incoming` into a document. `create` controls missing-document handling.
async fn merge_into(
    conn: &Connection,
    collection: &str,
    id: &str,
    incoming: Fields,
    create: bool,
) -> Result<(), StoreError> {
    let mut fields = match load_fields(conn, collection, id).await? {
        Some(existing) => existing,
        None if create => Fields::new(),
        None => {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
    };
    merge_fields(&mut fields, incoming);
    write_fields(conn, collection, id, &fields).await
}

#[async_trait]
impl DocumentStore for LibSqlStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(load_fields(self.conn(), collection, id)
            .await?
            .map(|fields| Document::new(id, fields)))
    }

    async fn query(&self, q: &Query) -> Result<Vec<Document>, StoreError> {
        let (sql, values) = query_sql(q)?;

        let mut rows = self
            .conn()
            .query(&sql, values)
            .await
            .map_err(|e| StoreError::Query(format!("query {}: {e}", q.collection)))?;

        let mut docs = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("query {}: {e}", q.collection)))?
        {
            let id: String = row
                .get(0)
                .map_err(|e| StoreError::Query(format!("query {}: {e}", q.collection)))?;
            let raw: String = row
                .get(1)
                .map_err(|e| StoreError::Query(format!("query {}: {e}", q.collection)))?;
            docs.push(Document::new(id, parse_fields(&raw)?));
        }

        // Ties in the requested order keep id order
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(collection = %q.collection, matched = docs.len(), "Query executed");
        Ok(query::sort_and_limit(docs, q))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| StoreError::Query(format!("set: {e}")))?;
        if let Err(e) = merge_into(&tx, collection, id, fields, true).await {
            let _ = tx.rollback().await;
            return Err(e);
        }
        tx.commit()
            .await
            .map_err(|e| StoreError::Query(format!("set commit: {e}")))?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| StoreError::Query(format!("update: {e}")))?;
        if let Err(e) = merge_into(&tx, collection, id, fields, false).await {
            let _ = tx.rollback().await;
            return Err(e);
        }
        tx.commit()
            .await
            .map_err(|e| StoreError::Query(format!("update commit: {e}")))?;
        Ok(())
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let count = ops.len();
        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| StoreError::Query(format!("batch_write: {e}")))?;
        for op in ops {
            if let Err(e) = merge_into(&tx, &op.collection, &op.id, op.fields, true).await {
                let _ = tx.rollback().await;
                return Err(e);
            }
        }
        tx.commit()
            .await
            .map_err(|e| StoreError::Query(format!("batch_write commit: {e}")))?;
        debug!(count, "Batch write committed");
        Ok(())
    }
}
