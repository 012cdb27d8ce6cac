//! Entity model for callpoints, devices, assignments, actions,
//! notifications and events.
//!
//! # Responsibility
//! - Define the stored document shape of every entity kind.
//! - Expose identity and natural-key accessors used by the store gateway and
//!   the uniqueness guard.
//!
//! # Invariants
//! - `id` is store-assigned, never part of the stored document body and
//!   never reused.
//! - Natural keys (`acID`, `asID`, `cpID`, `dvID`) are caller-assigned;
//!   `ntID`/`evID` are generated once at creation.

pub mod action;
pub mod assignment;
pub mod callpoint;
pub mod device;
pub mod event;
pub mod kind;
pub mod notification;
pub mod payload;
pub mod timestamp;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use kind::{fields, EntityId, Kind};

/// Record type persisted in one collection of the document store.
pub trait Entity: Serialize + DeserializeOwned + Send {
    /// Collection holding records of this type.
    const KIND: Kind;

    fn id(&self) -> EntityId;

    /// Copies the store identity onto the in-memory record.
    fn set_id(&mut self, id: EntityId);
}

/// Entity carrying a caller-supplied natural key that must be unique.
pub trait NaturalKeyed: Entity {
    /// Stored field holding the natural key; always filterable on `KIND`.
    const KEY_FIELD: &'static str;

    fn natural_key(&self) -> &str;

    /// Applies creation timestamps right before the first insert.
    fn stamp_created(&mut self, now: DateTime<Utc>);
}
