//! Core error taxonomy.
//!
//! - "Nothing matched" is never an error: list paths return an empty `Vec`.
//! - `DuplicateKey` carries the id of the existing record so Add callers can
//!   recover the canonical record instead of failing hard.
//! - Store and broker failures are wrapped verbatim; nothing is retried.

use crate::messaging::BrokerError;
use crate::model::{EntityId, Kind};
use crate::store::StoreError;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A live record with the same natural key already exists.
    #[error("{kind} natural key `{key}` already exists with id {existing_id}")]
    DuplicateKey {
        kind: Kind,
        key: String,
        existing_id: EntityId,
    },
    /// Natural key is blank or contains control characters.
    #[error("invalid {kind} natural key `{key}`")]
    InvalidKey { kind: Kind, key: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    /// Record could not be converted to or from its stored document.
    #[error("{kind} document codec error: {source}")]
    Codec {
        kind: Kind,
        #[source]
        source: serde_json::Error,
    },
    /// Export rendering failed.
    #[error("json export error: {0}")]
    Export(#[source] serde_json::Error),
    #[error("deadline exceeded before {operation}")]
    DeadlineExceeded { operation: &'static str },
}

impl CoreError {
    /// Id of the pre-existing record for `DuplicateKey`, otherwise `None`.
    pub fn duplicate_id(&self) -> Option<EntityId> {
        match self {
            Self::DuplicateKey { existing_id, .. } => Some(*existing_id),
            _ => None,
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}
