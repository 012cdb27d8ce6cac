//! Event: append-only delivery/lifecycle record of a notification.

use super::{timestamp, Entity, EntityId, Kind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event visible to server-side consumers only.
pub const VISIBILITY_SERVER: &str = "server";
/// Event visible to every consumer.
pub const VISIBILITY_ALL: &str = "all";

/// Beginning of a notification.
pub const EV_TYPE_START: &str = "start";
/// First step of the start sequence.
pub const EV_SUB_TYPE_START_STEP1: &str = "1";
/// Service-level processing of a notification.
pub const EV_TYPE_SERVICES: &str = "services";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "evID")]
    pub ev_id: String,
    #[serde(rename = "ntID")]
    pub nt_id: String,
    #[serde(rename = "cpID")]
    pub cp_id: String,
    #[serde(rename = "dvID")]
    pub dv_id: String,
    pub visibility: String,
    pub ev_type: String,
    pub ev_sub_type: String,
    pub ev_description: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
}

impl Event {
    pub fn new(
        nt_id: impl Into<String>,
        ev_type: impl Into<String>,
        ev_sub_type: impl Into<String>,
    ) -> Self {
        Self {
            nt_id: nt_id.into(),
            visibility: VISIBILITY_ALL.to_string(),
            ev_type: ev_type.into(),
            ev_sub_type: ev_sub_type.into(),
            ..Self::default()
        }
    }
}

impl Entity for Event {
    const KIND: Kind = Kind::Events;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}
