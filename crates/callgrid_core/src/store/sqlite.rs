//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist every kind as JSON documents in one `documents` table.
//! - Evaluate filters and ordering with `json_extract`.
//! - Provide an atomic conditional insert via an immediate transaction.
//!
//! # Invariants
//! - Returned stores have migrations fully applied.
//! - `AUTOINCREMENT` ids are never reused after deletes.

use super::migrations::apply_migrations;
use super::{
    ConditionalInsert, Document, DocumentStore, FieldFilter, Query, StoreError, StoreResult,
};
use crate::model::{EntityId, Kind};
use log::{error, info};
use rusqlite::types::Value as SqlValue;
use rusqlite::{
    params, params_from_iter, Connection, OpenFlags, OptionalExtension, TransactionBehavior,
};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// [`DocumentStore`] over one SQLite connection.
#[derive(Debug)]
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Opens (or creates) a database file and applies pending migrations.
    ///
    /// # Side effects
    /// - Emits `db_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with("file", || Connection::open(path))
    }

    /// Opens an existing database file; a missing file is an error, never
    /// an empty new database.
    pub fn open_existing(path: impl AsRef<Path>) -> StoreResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::open_with("existing", || Connection::open_with_flags(path, flags))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open_with("memory", Connection::open_in_memory)
    }

    fn open_with(
        mode: &'static str,
        connect: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=store status=start mode={mode}");

        let mut conn = connect().map_err(|err| {
            error!(
                "event=db_open module=store status=error mode={mode} duration_ms={} error_code=db_open_failed error={err}",
                started_at.elapsed().as_millis()
            );
            StoreError::from(err)
        })?;

        if let Err(err) = bootstrap_connection(&mut conn) {
            error!(
                "event=db_open module=store status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err);
        }

        info!(
            "event=db_open module=store status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Current `PRAGMA user_version` of the underlying database.
    pub fn schema_version(&self) -> StoreResult<u32> {
        super::migrations::current_user_version(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves SQLite to roll back the open statement.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn put(&self, kind: Kind, body: &Value) -> StoreResult<EntityId> {
        let text = encode_body(kind, body)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO documents (kind, body) VALUES (?1, ?2);",
            params![kind.as_str(), text],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_all(&self, query: &Query<'_>) -> StoreResult<Vec<Document>> {
        let mut sql = String::from("SELECT id, body FROM documents WHERE kind = ?");
        let mut bind_values = vec![SqlValue::Text(query.kind.as_str().to_string())];

        if let Some(filter) = query.filter {
            sql.push_str(" AND json_extract(body, ?) = ?");
            bind_values.push(SqlValue::Text(json_path(filter.field)));
            bind_values.push(SqlValue::Text(filter.value.to_string()));
        }

        match query.order_by {
            Some(order_field) => {
                sql.push_str(" ORDER BY json_extract(body, ?) ASC, id ASC");
                bind_values.push(SqlValue::Text(json_path(order_field)));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let id: EntityId = row.get(0)?;
            let text: String = row.get(1)?;
            documents.push(Document {
                id,
                body: decode_body(query.kind, id, &text)?,
            });
        }
        Ok(documents)
    }

    fn delete(&self, kind: Kind, id: EntityId) -> StoreResult<()> {
        let changed = self.lock().execute(
            "DELETE FROM documents WHERE kind = ?1 AND id = ?2;",
            params![kind.as_str(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { kind, id });
        }
        Ok(())
    }

    fn put_if_absent(
        &self,
        kind: Kind,
        filter: FieldFilter<'_>,
        body: &Value,
    ) -> StoreResult<ConditionalInsert> {
        let text = encode_body(kind, body)?;
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<EntityId> = tx
            .query_row(
                "SELECT id FROM documents
                 WHERE kind = ?1 AND json_extract(body, ?2) = ?3
                 ORDER BY id ASC
                 LIMIT 1;",
                params![kind.as_str(), json_path(filter.field), filter.value],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            tx.rollback()?;
            return Ok(ConditionalInsert::Existing(id));
        }

        tx.execute(
            "INSERT INTO documents (kind, body) VALUES (?1, ?2);",
            params![kind.as_str(), text],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(ConditionalInsert::Inserted(id))
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}

/// Quoted JSON path so field names are never interpreted as path syntax.
fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', ""))
}

fn encode_body(kind: Kind, body: &Value) -> StoreResult<String> {
    if !body.is_object() {
        return Err(StoreError::InvalidDocument {
            kind,
            message: "document body must be a JSON object".to_string(),
        });
    }
    Ok(body.to_string())
}

fn decode_body(kind: Kind, id: EntityId, text: &str) -> StoreResult<Value> {
    serde_json::from_str(text).map_err(|err| StoreError::InvalidDocument {
        kind,
        message: format!("document {id} is not valid JSON: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{json_path, SqliteDocumentStore};
    use crate::model::Kind;
    use crate::store::{latest_version, ConditionalInsert, DocumentStore, FieldFilter, Query};
    use serde_json::json;

    #[test]
    fn open_in_memory_applies_all_migrations() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), latest_version());
    }

    #[test]
    fn json_path_quotes_field_names() {
        assert_eq!(json_path("cpID"), "$.\"cpID\"");
        assert_eq!(json_path("a\"b"), "$.\"ab\"");
    }

    #[test]
    fn filter_and_order_use_document_fields() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let second = store
            .put(
                Kind::Events,
                &json!({"ntID": "n1", "created": "2024-01-02T00:00:00.000000Z"}),
            )
            .unwrap();
        let first = store
            .put(
                Kind::Events,
                &json!({"ntID": "n1", "created": "2024-01-01T00:00:00.000000Z"}),
            )
            .unwrap();
        store
            .put(
                Kind::Events,
                &json!({"ntID": "n2", "created": "2023-01-01T00:00:00.000000Z"}),
            )
            .unwrap();
        store
            .put(
                Kind::Notifications,
                &json!({"ntID": "n1", "created": "2020-01-01T00:00:00.000000Z"}),
            )
            .unwrap();

        let query = Query::all(Kind::Events)
            .filter("ntID", "n1")
            .order_by("created");
        let ids: Vec<_> = store
            .get_all(&query)
            .unwrap()
            .into_iter()
            .map(|doc| doc.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn conditional_insert_reports_existing_record() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let filter = FieldFilter {
            field: "acID",
            value: "ac-1",
        };
        let inserted = store
            .put_if_absent(Kind::Actions, filter, &json!({"acID": "ac-1"}))
            .unwrap();
        let ConditionalInsert::Inserted(id) = inserted else {
            panic!("first conditional insert must write");
        };

        let again = store
            .put_if_absent(Kind::Actions, filter, &json!({"acID": "ac-1"}))
            .unwrap();
        assert_eq!(again, ConditionalInsert::Existing(id));
        assert_eq!(store.get_all(&Query::all(Kind::Actions)).unwrap().len(), 1);
    }
}
