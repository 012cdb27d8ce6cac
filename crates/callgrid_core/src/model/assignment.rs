//! Assignment: configured binding between one callpoint and one device.
//!
//! # Invariants
//! - `callpoint` and `device` are enrichment views populated at read time
//!   and never persisted.
//! - References are not checked on write; an assignment may point at a
//!   callpoint or device that does not (or no longer) exist.

use super::callpoint::CallpointSummary;
use super::device::DeviceSummary;
use super::payload::RawPayload;
use super::{fields, timestamp, Entity, EntityId, Kind, NaturalKeyed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Assignment {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "asID")]
    pub as_id: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub changed: DateTime<Utc>,
    pub description: String,
    #[serde(rename = "cpID")]
    pub cp_id: String,
    #[serde(rename = "dvID")]
    pub dv_id: String,
    pub level: i32,
    pub settings: RawPayload,
    pub raw_request: RawPayload,
    #[serde(skip)]
    pub callpoint: CallpointSummary,
    #[serde(skip)]
    pub device: DeviceSummary,
}

impl Assignment {
    pub fn new(
        as_id: impl Into<String>,
        cp_id: impl Into<String>,
        dv_id: impl Into<String>,
    ) -> Self {
        Self {
            as_id: as_id.into(),
            cp_id: cp_id.into(),
            dv_id: dv_id.into(),
            ..Self::default()
        }
    }
}

impl Entity for Assignment {
    const KIND: Kind = Kind::Assignments;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl NaturalKeyed for Assignment {
    const KEY_FIELD: &'static str = fields::AS_ID;

    fn natural_key(&self) -> &str {
        &self.as_id
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created = now;
        self.changed = now;
    }
}
