//! Device: an output channel that delivers notifications.

use super::payload::RawPayload;
use super::{fields, timestamp, Entity, EntityId, Kind, NaturalKeyed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Device {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "dvID")]
    pub dv_id: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp::option")]
    pub changed: Option<DateTime<Utc>>,
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub priority: i32,
    pub icon: String,
    /// Device can acknowledge or answer a notification.
    pub is_two_way: bool,
    pub category: String,
    pub destination: String,
    pub settings: RawPayload,
    pub raw_request: RawPayload,
}

impl Device {
    pub fn new(dv_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            dv_id: dv_id.into(),
            label: label.into(),
            ..Self::default()
        }
    }
}

impl Entity for Device {
    const KIND: Kind = Kind::Devices;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl NaturalKeyed for Device {
    const KEY_FIELD: &'static str = fields::DV_ID;

    fn natural_key(&self) -> &str {
        &self.dv_id
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created = now;
    }
}

/// Read-time copy of device fields embedded in an assignment.
///
/// A default (empty) summary means the referenced device was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSummary {
    pub dv_id: String,
    pub label: String,
    pub priority: i32,
    pub kind: i32,
    pub icon: String,
    pub description: String,
    pub is_two_way: bool,
    pub category: String,
    pub settings: RawPayload,
    pub raw_request: RawPayload,
}

impl DeviceSummary {
    pub fn is_empty(&self) -> bool {
        self.dv_id.is_empty()
    }
}

impl From<&Device> for DeviceSummary {
    fn from(value: &Device) -> Self {
        Self {
            dv_id: value.dv_id.clone(),
            label: value.label.clone(),
            priority: value.priority,
            kind: value.kind,
            icon: value.icon.clone(),
            description: value.description.clone(),
            is_two_way: value.is_two_way,
            category: value.category.clone(),
            settings: value.settings.clone(),
            raw_request: value.raw_request.clone(),
        }
    }
}
