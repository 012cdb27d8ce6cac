//! Callpoint: a physical or logical endpoint that raises actions.

use super::payload::RawPayload;
use super::{fields, timestamp, Entity, EntityId, Kind, NaturalKeyed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Callpoint {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "cpID")]
    pub cp_id: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp::option")]
    pub changed: Option<DateTime<Utc>>,
    pub abs_address: String,
    pub label: String,
    pub description: String,
    /// Serialized as `type`.
    #[serde(rename = "type")]
    pub kind: i32,
    pub priority: i32,
    pub icon: String,
    pub raw_request: RawPayload,
}

impl Callpoint {
    pub fn new(cp_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            cp_id: cp_id.into(),
            label: label.into(),
            ..Self::default()
        }
    }
}

impl Entity for Callpoint {
    const KIND: Kind = Kind::Callpoints;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl NaturalKeyed for Callpoint {
    const KEY_FIELD: &'static str = fields::CP_ID;

    fn natural_key(&self) -> &str {
        &self.cp_id
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created = now;
    }
}

/// Read-time copy of callpoint display fields embedded in an assignment.
///
/// A default (empty) summary means the referenced callpoint was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallpointSummary {
    pub cp_id: String,
    pub label: String,
    pub priority: i32,
    pub abs_address: String,
    pub kind: i32,
    pub icon: String,
    pub description: String,
}

impl CallpointSummary {
    pub fn is_empty(&self) -> bool {
        self.cp_id.is_empty()
    }
}

impl From<&Callpoint> for CallpointSummary {
    fn from(value: &Callpoint) -> Self {
        Self {
            cp_id: value.cp_id.clone(),
            label: value.label.clone(),
            priority: value.priority,
            abs_address: value.abs_address.clone(),
            kind: value.kind,
            icon: value.icon.clone(),
            description: value.description.clone(),
        }
    }
}
