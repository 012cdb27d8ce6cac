//! Error types for document store operations.

use crate::model::{EntityId, Kind};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite backend failure.
    #[error("sqlite store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Filter or order field missing from the kind's index table.
    #[error("field `{field}` is not indexed on {kind}")]
    UnindexedField { kind: Kind, field: String },
    /// Delete target does not exist.
    #[error("{kind} record {id} not found")]
    NotFound { kind: Kind, id: EntityId },
    /// Backend lacks an optional primitive.
    #[error("document store does not support {0}")]
    Unsupported(&'static str),
    /// Stored body is not a JSON object.
    #[error("invalid stored document in {kind}: {message}")]
    InvalidDocument { kind: Kind, message: String },
    #[error("document schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Transport-level failure reported by a remote backend.
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}
