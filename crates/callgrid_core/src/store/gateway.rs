//! Typed gateway over one [`DocumentStore`].
//!
//! # Responsibility
//! - Encode/decode entities to and from stored documents.
//! - Copy the out-of-band store id back onto every decoded record.
//! - Reject filters and orderings outside the kind's index table.
//!
//! # Invariants
//! - Every call is one synchronous round trip; no retries, no pagination.
//! - The context deadline is checked before each round trip.

use super::{ConditionalInsert, Document, DocumentStore, FieldFilter, Query, StoreError};
use crate::error::{CoreError, CoreResult};
use crate::model::{Entity, EntityId, Kind};
use crate::observe::OpContext;
use serde_json::Value;
use std::sync::Arc;

const MODULE: &str = "store";

/// Cloneable handle shared by repositories, guard and resolver.
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn DocumentStore>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Inserts `record` and returns the generated id.
    pub fn insert<T: Entity>(&self, ctx: &OpContext, record: &T) -> CoreResult<EntityId> {
        ctx.check_deadline("store_insert")?;
        let body = encode(record)?;
        let id = self.store.put(T::KIND, &body).map_err(|err| {
            report_failure(ctx, "store_insert", T::KIND, &err);
            err
        })?;
        ctx.debug(
            MODULE,
            "store_insert",
            format_args!("status=ok kind={} id={id}", T::KIND),
        );
        Ok(id)
    }

    /// Inserts `record` unless a committed record already has `key` in `key_field`.
    pub fn insert_if_absent<T: Entity>(
        &self,
        ctx: &OpContext,
        key_field: &str,
        key: &str,
        record: &T,
    ) -> CoreResult<ConditionalInsert> {
        ensure_filterable(T::KIND, key_field)?;
        ctx.check_deadline("store_insert_if_absent")?;
        let body = encode(record)?;
        let filter = FieldFilter {
            field: key_field,
            value: key,
        };
        let outcome = self
            .store
            .put_if_absent(T::KIND, filter, &body)
            .map_err(|err| {
                report_failure(ctx, "store_insert_if_absent", T::KIND, &err);
                err
            })?;
        ctx.debug(
            MODULE,
            "store_insert_if_absent",
            format_args!("status=ok kind={} outcome={outcome:?}", T::KIND),
        );
        Ok(outcome)
    }

    /// Returns all records whose `field` equals `value`, in id order.
    pub fn query_by_field<T: Entity>(
        &self,
        ctx: &OpContext,
        field: &str,
        value: &str,
    ) -> CoreResult<Vec<T>> {
        ensure_filterable(T::KIND, field)?;
        self.run(ctx, Query::all(T::KIND).filter(field, value))
    }

    /// Returns all records whose `field` equals `value`, sorted by `order_field`.
    pub fn query_by_field_ordered<T: Entity>(
        &self,
        ctx: &OpContext,
        field: &str,
        value: &str,
        order_field: &str,
    ) -> CoreResult<Vec<T>> {
        ensure_filterable(T::KIND, field)?;
        ensure_orderable(T::KIND, order_field)?;
        self.run(
            ctx,
            Query::all(T::KIND).filter(field, value).order_by(order_field),
        )
    }

    /// Returns every record of the kind sorted by `order_field`.
    pub fn query_all_ordered<T: Entity>(
        &self,
        ctx: &OpContext,
        order_field: &str,
    ) -> CoreResult<Vec<T>> {
        ensure_orderable(T::KIND, order_field)?;
        self.run(ctx, Query::all(T::KIND).order_by(order_field))
    }

    pub fn delete_by_id(&self, ctx: &OpContext, kind: Kind, id: EntityId) -> CoreResult<()> {
        ctx.check_deadline("store_delete")?;
        self.store.delete(kind, id).map_err(|err| {
            report_failure(ctx, "store_delete", kind, &err);
            err
        })?;
        ctx.debug(
            MODULE,
            "store_delete",
            format_args!("status=ok kind={kind} id={id}"),
        );
        Ok(())
    }

    fn run<T: Entity>(&self, ctx: &OpContext, query: Query<'_>) -> CoreResult<Vec<T>> {
        ctx.check_deadline("store_query")?;
        let documents = self.store.get_all(&query).map_err(|err| {
            report_failure(ctx, "store_query", query.kind, &err);
            err
        })?;
        ctx.debug(
            MODULE,
            "store_query",
            format_args!(
                "status=ok kind={} filter={} order_by={} returned={}",
                query.kind,
                query
                    .filter
                    .map(|filter| filter.field)
                    .unwrap_or("none"),
                query.order_by.unwrap_or("none"),
                documents.len()
            ),
        );
        documents.into_iter().map(decode::<T>).collect()
    }
}

fn ensure_filterable(kind: Kind, field: &str) -> CoreResult<()> {
    if kind.is_filterable(field) {
        return Ok(());
    }
    Err(StoreError::UnindexedField {
        kind,
        field: field.to_string(),
    }
    .into())
}

fn ensure_orderable(kind: Kind, field: &str) -> CoreResult<()> {
    if kind.is_orderable(field) {
        return Ok(());
    }
    Err(StoreError::UnindexedField {
        kind,
        field: field.to_string(),
    }
    .into())
}

fn encode<T: Entity>(record: &T) -> CoreResult<Value> {
    serde_json::to_value(record).map_err(|source| CoreError::Codec {
        kind: T::KIND,
        source,
    })
}

fn decode<T: Entity>(document: Document) -> CoreResult<T> {
    let mut record: T =
        serde_json::from_value(document.body).map_err(|source| CoreError::Codec {
            kind: T::KIND,
            source,
        })?;
    record.set_id(document.id);
    Ok(record)
}

fn report_failure(ctx: &OpContext, event: &'static str, kind: Kind, err: &StoreError) {
    ctx.warn(
        MODULE,
        event,
        format_args!("status=error kind={kind} error={err}"),
    );
}

#[cfg(test)]
mod tests {
    use super::StoreGateway;
    use crate::error::CoreError;
    use crate::model::callpoint::Callpoint;
    use crate::model::event::Event;
    use crate::model::fields;
    use crate::observe::OpContext;
    use crate::store::{MemoryDocumentStore, StoreError};
    use std::sync::Arc;

    #[test]
    fn query_copies_store_id_onto_records() {
        let gateway = StoreGateway::new(Arc::new(MemoryDocumentStore::new()));
        let ctx = OpContext::silent();

        let id = gateway
            .insert(&ctx, &Callpoint::new("cp-1", "Lobby"))
            .unwrap();
        let found: Vec<Callpoint> = gateway
            .query_by_field(&ctx, fields::CP_ID, "cp-1")
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert_eq!(found[0].label, "Lobby");
    }

    #[test]
    fn unindexed_filter_is_rejected_before_io() {
        let gateway = StoreGateway::new(Arc::new(MemoryDocumentStore::new()));
        let err = gateway
            .query_by_field::<Event>(&OpContext::silent(), "visibility", "all")
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Store(StoreError::UnindexedField { ref field, .. }) if field == "visibility"
        ));
    }
}
