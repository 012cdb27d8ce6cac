//! In-process document store with optional eventual-consistency lag.
//!
//! # Responsibility
//! - Serve tests and local runs without a database.
//! - Simulate a replica whose secondary-index queries lag behind writes.
//!
//! # Invariants
//! - `get_all` only returns documents committed at least `visibility_lag` ago.
//! - `put_if_absent` and `delete` act on committed state, ignoring the lag.
//! - Ids start at 1 and are never reused, even after deletes.

use super::{ConditionalInsert, Document, DocumentStore, FieldFilter, Query, StoreResult};
use crate::model::{EntityId, Kind};
use crate::store::StoreError;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct StoredDocument {
    id: EntityId,
    body: Value,
    committed_at: Instant,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: EntityId,
    kinds: BTreeMap<Kind, Vec<StoredDocument>>,
}

impl MemoryState {
    fn push(&mut self, kind: Kind, body: &Value) -> EntityId {
        self.last_id += 1;
        let id = self.last_id;
        self.kinds.entry(kind).or_default().push(StoredDocument {
            id,
            body: body.clone(),
            committed_at: Instant::now(),
        });
        id
    }
}

/// Mutex-guarded in-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: Mutex<MemoryState>,
    visibility_lag: Duration,
}

impl MemoryDocumentStore {
    /// Strongly consistent store: every write is visible immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose queries do not see a write until `lag` has elapsed.
    pub fn with_visibility_lag(lag: Duration) -> Self {
        Self {
            state: Mutex::default(),
            visibility_lag: lag,
        }
    }

    /// Number of committed documents of `kind`, visible or not.
    pub fn committed_len(&self, kind: Kind) -> usize {
        self.lock().kinds.get(&kind).map_or(0, Vec::len)
    }

    /// A lag too large to represent means the write never becomes visible.
    fn is_visible(&self, doc: &StoredDocument, now: Instant) -> bool {
        doc.committed_at
            .checked_add(self.visibility_lag)
            .is_some_and(|visible_at| visible_at <= now)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // Every mutation completes before the guard drops, so a poisoned
        // state is still internally consistent.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn put(&self, kind: Kind, body: &Value) -> StoreResult<EntityId> {
        ensure_object(kind, body)?;
        Ok(self.lock().push(kind, body))
    }

    fn get_all(&self, query: &Query<'_>) -> StoreResult<Vec<Document>> {
        let state = self.lock();
        let now = Instant::now();
        let mut matches: Vec<&StoredDocument> = state
            .kinds
            .get(&query.kind)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| self.is_visible(doc, now))
                    .filter(|doc| query.filter.map_or(true, |filter| matches(doc, filter)))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order_field) = query.order_by {
            matches.sort_by(|left, right| {
                compare_values(left.body.get(order_field), right.body.get(order_field))
                    .then(left.id.cmp(&right.id))
            });
        }

        Ok(matches
            .into_iter()
            .map(|doc| Document {
                id: doc.id,
                body: doc.body.clone(),
            })
            .collect())
    }

    fn delete(&self, kind: Kind, id: EntityId) -> StoreResult<()> {
        let mut state = self.lock();
        let documents = state.kinds.entry(kind).or_default();
        let before = documents.len();
        documents.retain(|doc| doc.id != id);
        if documents.len() == before {
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
        ensure_object(kind, body)?;
        let mut state = self.lock();
        let existing = state
            .kinds
            .get(&kind)
            .and_then(|documents| documents.iter().find(|doc| matches(doc, filter)))
            .map(|doc| doc.id);
        if let Some(id) = existing {
            return Ok(ConditionalInsert::Existing(id));
        }
        Ok(ConditionalInsert::Inserted(state.push(kind, body)))
    }
}

fn ensure_object(kind: Kind, body: &Value) -> StoreResult<()> {
    if body.is_object() {
        return Ok(());
    }
    Err(StoreError::InvalidDocument {
        kind,
        message: "document body must be a JSON object".to_string(),
    })
}

fn matches(doc: &StoredDocument, filter: FieldFilter<'_>) -> bool {
    doc.body
        .get(filter.field)
        .and_then(Value::as_str)
        .is_some_and(|value| value == filter.value)
}

/// Orders missing/null < bool < number < string, like a typed index would.
fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (left, right) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}
