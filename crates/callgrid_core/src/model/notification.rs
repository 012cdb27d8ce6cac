//! Notification: one dispatch spawned by an action.
//!
//! `ntID` is generated when the notification is added and is the
//! authoritative identifier; `acID` is a foreign key and not unique.

use super::{timestamp, Entity, EntityId, Kind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notification {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "ntID")]
    pub nt_id: String,
    #[serde(rename = "acID")]
    pub ac_id: String,
    pub priority: i32,
    pub category: String,
    pub destination: String,
    pub message: String,
    pub response_title: String,
    pub options: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
}

impl Notification {
    pub fn new(ac_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ac_id: ac_id.into(),
            message: message.into(),
            ..Self::default()
        }
    }
}

impl Entity for Notification {
    const KIND: Kind = Kind::Notifications;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}
