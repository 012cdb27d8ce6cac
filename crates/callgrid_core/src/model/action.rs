//! Action: a triggering request raised by a callpoint.

use super::payload::RawPayload;
use super::{fields, timestamp, Entity, EntityId, Kind, NaturalKeyed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Action {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "acID")]
    pub ac_id: String,
    #[serde(rename = "cpID")]
    pub cp_id: String,
    pub action: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    pub raw_request: RawPayload,
}

impl Action {
    pub fn new(
        ac_id: impl Into<String>,
        cp_id: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            ac_id: ac_id.into(),
            cp_id: cp_id.into(),
            action: action.into(),
            ..Self::default()
        }
    }
}

impl Entity for Action {
    const KIND: Kind = Kind::Actions;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl NaturalKeyed for Action {
    const KEY_FIELD: &'static str = fields::AC_ID;

    fn natural_key(&self) -> &str {
        &self.ac_id
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created = now;
    }
}
