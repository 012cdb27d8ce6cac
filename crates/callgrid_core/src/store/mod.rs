//! Document store abstraction and backends.
//!
//! # Responsibility
//! - Define the primitive operations the core needs from a schemaless
//!   document store: put with generated id, filtered get-all, ordered
//!   get-all, delete by id, and an optional conditional insert.
//! - Provide the typed [`StoreGateway`] used by every repository.
//!
//! # Invariants
//! - Ids are assigned by the backend, strictly increasing and never reused.
//! - Ordered queries sort by the order field ascending, ties by id ascending.
//! - Unordered queries return ascending id order.
//! - Backends never retry; failures surface to the caller unchanged.

mod error;
pub mod gateway;
pub mod memory;
mod migrations;
pub mod sqlite;

use crate::model::{EntityId, Kind};
use serde_json::Value;

pub use error::{StoreError, StoreResult};
pub use gateway::StoreGateway;
pub use memory::MemoryDocumentStore;
pub use migrations::latest_version;
pub use sqlite::SqliteDocumentStore;

/// One stored document with its out-of-band identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: EntityId,
    pub body: Value,
}

/// Equality filter on one string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFilter<'a> {
    pub field: &'a str,
    pub value: &'a str,
}

/// Get-all request against one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query<'a> {
    pub kind: Kind,
    pub filter: Option<FieldFilter<'a>>,
    pub order_by: Option<&'a str>,
}

impl<'a> Query<'a> {
    pub fn all(kind: Kind) -> Self {
        Self {
            kind,
            filter: None,
            order_by: None,
        }
    }

    pub fn filter(mut self, field: &'a str, value: &'a str) -> Self {
        self.filter = Some(FieldFilter { field, value });
        self
    }

    pub fn order_by(mut self, field: &'a str) -> Self {
        self.order_by = Some(field);
        self
    }
}

/// Outcome of [`DocumentStore::put_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalInsert {
    Inserted(EntityId),
    /// A record matching the filter already existed; nothing was written.
    Existing(EntityId),
}

/// Primitive operations of the backing document store.
pub trait DocumentStore: Send + Sync {
    /// Stores `body` under a newly generated id.
    fn put(&self, kind: Kind, body: &Value) -> StoreResult<EntityId>;

    /// Returns every document matching `query`, without pagination.
    fn get_all(&self, query: &Query<'_>) -> StoreResult<Vec<Document>>;

    /// Deletes one document; a missing id is `StoreError::NotFound`.
    fn delete(&self, kind: Kind, id: EntityId) -> StoreResult<()>;

    /// Atomically stores `body` unless a committed document matches `filter`.
    fn put_if_absent(
        &self,
        kind: Kind,
        filter: FieldFilter<'_>,
        body: &Value,
    ) -> StoreResult<ConditionalInsert> {
        let _ = (kind, filter, body);
        Err(StoreError::Unsupported("conditional insert"))
    }
}
