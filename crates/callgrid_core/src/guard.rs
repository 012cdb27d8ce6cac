//! Natural-key uniqueness guard for Add operations.
//!
//! # Responsibility
//! - Enforce at-most-one live record per natural key (`acID`, `asID`,
//!   `cpID`, `dvID`), which the document store does not do natively.
//! - Stamp creation timestamps on the first insert.
//!
//! # Invariants
//! - A duplicate is reported as `CoreError::DuplicateKey` carrying the id of
//!   the first existing match; nothing is written in that case.
//! - `CheckThenInsert` is a read-then-write: two concurrent adds of the same
//!   key can both observe "absent" on a lagging index and both insert.
//!   `ConditionalWrite` closes that window where the store supports it.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::model::{EntityId, NaturalKeyed};
use crate::observe::OpContext;
use crate::store::{ConditionalInsert, StoreGateway};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MODULE: &str = "guard";

/// Non-blank, no control characters, no surrounding whitespace, <= 256 chars.
static NATURAL_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s\x00-\x1f\x7f](?:[^\x00-\x1f\x7f]{0,254}[^\s\x00-\x1f\x7f])?$")
        .expect("valid natural key regex")
});

/// How the guard turns "check" and "insert" into one Add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessMode {
    /// Filtered query, then insert. Racy under eventual consistency.
    #[default]
    CheckThenInsert,
    /// Single store-side conditional insert against committed state.
    ConditionalWrite,
}

/// Returns whether `key` is acceptable as a natural key.
pub fn is_valid_natural_key(key: &str) -> bool {
    NATURAL_KEY_RE.is_match(key)
}

#[derive(Clone)]
pub struct UniquenessGuard {
    gateway: StoreGateway,
    clock: Arc<dyn Clock>,
    mode: UniquenessMode,
}

impl UniquenessGuard {
    pub fn new(gateway: StoreGateway, clock: Arc<dyn Clock>, mode: UniquenessMode) -> Self {
        Self {
            gateway,
            clock,
            mode,
        }
    }

    pub fn gateway(&self) -> &StoreGateway {
        &self.gateway
    }

    /// Inserts `candidate` unless its natural key is already registered.
    ///
    /// # Errors
    /// - `InvalidKey` when the natural key is blank or malformed.
    /// - `DuplicateKey { existing_id }` when a record with the key exists.
    /// - Store/transport errors unchanged.
    pub fn add_if_absent<T: NaturalKeyed>(
        &self,
        ctx: &OpContext,
        mut candidate: T,
    ) -> CoreResult<EntityId> {
        let key = candidate.natural_key().to_string();
        if !is_valid_natural_key(&key) {
            return Err(CoreError::InvalidKey { kind: T::KIND, key });
        }
        candidate.stamp_created(self.clock.now());

        let result = match self.mode {
            UniquenessMode::CheckThenInsert => self.check_then_insert(ctx, &key, &candidate),
            UniquenessMode::ConditionalWrite => self.conditional_write(ctx, &key, &candidate),
        };

        match &result {
            Ok(id) => ctx.info(
                MODULE,
                "entity_add",
                format_args!("status=ok kind={} key={key} id={id}", T::KIND),
            ),
            Err(CoreError::DuplicateKey { existing_id, .. }) => ctx.info(
                MODULE,
                "entity_add",
                format_args!(
                    "status=duplicate kind={} key={key} existing_id={existing_id}",
                    T::KIND
                ),
            ),
            Err(err) => ctx.warn(
                MODULE,
                "entity_add",
                format_args!("status=error kind={} key={key} error={err}", T::KIND),
            ),
        }
        result
    }

    fn check_then_insert<T: NaturalKeyed>(
        &self,
        ctx: &OpContext,
        key: &str,
        candidate: &T,
    ) -> CoreResult<EntityId> {
        let existing: Vec<T> = self.gateway.query_by_field(ctx, T::KEY_FIELD, key)?;
        if let Some(first) = existing.first() {
            return Err(duplicate::<T>(key, first.id()));
        }
        self.gateway.insert(ctx, candidate)
    }

    fn conditional_write<T: NaturalKeyed>(
        &self,
        ctx: &OpContext,
        key: &str,
        candidate: &T,
    ) -> CoreResult<EntityId> {
        match self
            .gateway
            .insert_if_absent(ctx, T::KEY_FIELD, key, candidate)?
        {
            ConditionalInsert::Inserted(id) => Ok(id),
            ConditionalInsert::Existing(id) => Err(duplicate::<T>(key, id)),
        }
    }
}

fn duplicate<T: NaturalKeyed>(key: &str, existing_id: EntityId) -> CoreError {
    CoreError::DuplicateKey {
        kind: T::KIND,
        key: key.to_string(),
        existing_id,
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_natural_key;

    #[test]
    fn natural_key_validation() {
        assert!(is_valid_natural_key("cp-001"));
        assert!(is_valid_natural_key("a"));
        assert!(is_valid_natural_key("floor 2 / room 14"));
        assert!(!is_valid_natural_key(""));
        assert!(!is_valid_natural_key("   "));
        assert!(!is_valid_natural_key(" padded"));
        assert!(!is_valid_natural_key("padded "));
        assert!(!is_valid_natural_key("line\nbreak"));
        assert!(!is_valid_natural_key(&"k".repeat(257)));
        assert!(is_valid_natural_key(&"k".repeat(256)));
    }
}
