//! JSON export of stored entities.
//!
//! # Responsibility
//! - Define the external JSON shape of every entity kind as typed records.
//! - Render slices of entities as one JSON array.
//!
//! # Invariants
//! - Every record carries the numeric store id as `ID`.
//! - Free-form payloads render as raw JSON; blank text renders as `null`,
//!   non-JSON text as a JSON string.
//! - Assignment records embed `callpoint` and `device` views rendered with
//!   the same payload rules.

use crate::error::{CoreError, CoreResult};
use crate::model::action::Action;
use crate::model::assignment::Assignment;
use crate::model::callpoint::{Callpoint, CallpointSummary};
use crate::model::device::{Device, DeviceSummary};
use crate::model::event::Event;
use crate::model::notification::Notification;
use crate::model::{timestamp, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity with a defined export record.
pub trait Exportable {
    type Record: Serialize;

    fn to_record(&self) -> Self::Record;
}

/// Renders already-built records as a pretty-printed JSON array.
pub fn to_json_array<R: Serialize>(records: &[R]) -> CoreResult<String> {
    serde_json::to_string_pretty(records).map_err(CoreError::Export)
}

/// Converts `items` to their records and renders them as a JSON array.
pub fn export_json<E: Exportable>(items: &[E]) -> CoreResult<String> {
    let records: Vec<E::Record> = items.iter().map(Exportable::to_record).collect();
    to_json_array(&records)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(rename = "acID")]
    pub ac_id: String,
    #[serde(rename = "cpID")]
    pub cp_id: String,
    pub action: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    pub raw_request: Value,
}

impl Exportable for Action {
    type Record = ActionRecord;

    fn to_record(&self) -> ActionRecord {
        ActionRecord {
            id: self.id,
            ac_id: self.ac_id.clone(),
            cp_id: self.cp_id.clone(),
            action: self.action.clone(),
            description: self.description.clone(),
            created: self.created,
            raw_request: self.raw_request.to_json_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallpointRecord {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(rename = "cpID")]
    pub cp_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub icon: String,
    pub description: String,
    pub priority: i32,
    pub abs_address: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp::option")]
    pub changed: Option<DateTime<Utc>>,
    pub raw_request: Value,
}

impl Exportable for Callpoint {
    type Record = CallpointRecord;

    fn to_record(&self) -> CallpointRecord {
        CallpointRecord {
            id: self.id,
            cp_id: self.cp_id.clone(),
            label: self.label.clone(),
            kind: self.kind,
            icon: self.icon.clone(),
            description: self.description.clone(),
            priority: self.priority,
            abs_address: self.abs_address.clone(),
            created: self.created,
            changed: self.changed,
            raw_request: self.raw_request.to_json_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(rename = "dvID")]
    pub dv_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub icon: String,
    pub description: String,
    pub is_two_way: bool,
    pub category: String,
    pub destination: String,
    pub priority: i32,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp::option")]
    pub changed: Option<DateTime<Utc>>,
    pub settings: Value,
    pub raw_request: Value,
}

impl Exportable for Device {
    type Record = DeviceRecord;

    fn to_record(&self) -> DeviceRecord {
        DeviceRecord {
            id: self.id,
            dv_id: self.dv_id.clone(),
            label: self.label.clone(),
            kind: self.kind,
            icon: self.icon.clone(),
            description: self.description.clone(),
            is_two_way: self.is_two_way,
            category: self.category.clone(),
            destination: self.destination.clone(),
            priority: self.priority,
            created: self.created,
            changed: self.changed,
            settings: self.settings.to_json_value(),
            raw_request: self.raw_request.to_json_value(),
        }
    }
}

/// Callpoint view embedded in an assignment record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallpointViewRecord {
    #[serde(rename = "cpID")]
    pub cp_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub icon: String,
    pub description: String,
    pub priority: i32,
    pub abs_address: String,
}

impl From<&CallpointSummary> for CallpointViewRecord {
    fn from(value: &CallpointSummary) -> Self {
        Self {
            cp_id: value.cp_id.clone(),
            label: value.label.clone(),
            kind: value.kind,
            icon: value.icon.clone(),
            description: value.description.clone(),
            priority: value.priority,
            abs_address: value.abs_address.clone(),
        }
    }
}

/// Device view embedded in an assignment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceViewRecord {
    #[serde(rename = "dvID")]
    pub dv_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub icon: String,
    pub description: String,
    pub is_two_way: bool,
    pub category: String,
    pub priority: i32,
    pub settings: Value,
    pub raw_request: Value,
}

impl From<&DeviceSummary> for DeviceViewRecord {
    fn from(value: &DeviceSummary) -> Self {
        Self {
            dv_id: value.dv_id.clone(),
            label: value.label.clone(),
            kind: value.kind,
            icon: value.icon.clone(),
            description: value.description.clone(),
            is_two_way: value.is_two_way,
            category: value.category.clone(),
            priority: value.priority,
            settings: value.settings.to_json_value(),
            raw_request: value.raw_request.to_json_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(rename = "asID")]
    pub as_id: String,
    #[serde(rename = "cpID")]
    pub cp_id: String,
    #[serde(rename = "dvID")]
    pub dv_id: String,
    pub description: String,
    pub level: i32,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub changed: DateTime<Utc>,
    pub settings: Value,
    pub raw_request: Value,
    pub callpoint: CallpointViewRecord,
    pub device: DeviceViewRecord,
}

impl Exportable for Assignment {
    type Record = AssignmentRecord;

    fn to_record(&self) -> AssignmentRecord {
        AssignmentRecord {
            id: self.id,
            as_id: self.as_id.clone(),
            cp_id: self.cp_id.clone(),
            dv_id: self.dv_id.clone(),
            description: self.description.clone(),
            level: self.level,
            created: self.created,
            changed: self.changed,
            settings: self.settings.to_json_value(),
            raw_request: self.raw_request.to_json_value(),
            callpoint: CallpointViewRecord::from(&self.callpoint),
            device: DeviceViewRecord::from(&self.device),
        }
    }
}

/// `priority` is exported as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[serde(rename = "ID")]
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

impl Exportable for Notification {
    type Record = NotificationRecord;

    fn to_record(&self) -> NotificationRecord {
        NotificationRecord {
            id: self.id,
            nt_id: self.nt_id.clone(),
            ac_id: self.ac_id.clone(),
            priority: self.priority,
            category: self.category.clone(),
            destination: self.destination.clone(),
            message: self.message.clone(),
            response_title: self.response_title.clone(),
            options: self.options.clone(),
            created: self.created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(rename = "ID")]
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

impl Exportable for Event {
    type Record = EventRecord;

    fn to_record(&self) -> EventRecord {
        EventRecord {
            id: self.id,
            ev_id: self.ev_id.clone(),
            nt_id: self.nt_id.clone(),
            cp_id: self.cp_id.clone(),
            dv_id: self.dv_id.clone(),
            visibility: self.visibility.clone(),
            ev_type: self.ev_type.clone(),
            ev_sub_type: self.ev_sub_type.clone(),
            ev_description: self.ev_description.clone(),
            created: self.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{export_json, Exportable};
    use crate::model::callpoint::Callpoint;
    use crate::model::notification::Notification;
    use serde_json::{json, Value};

    #[test]
    fn empty_slice_renders_empty_array() {
        let text = export_json::<Callpoint>(&[]).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!([]));
    }

    #[test]
    fn callpoint_without_changed_exports_null() {
        let mut callpoint = Callpoint::new("cp-1", "Lobby");
        callpoint.id = 7;
        let value = serde_json::to_value(callpoint.to_record()).unwrap();
        assert_eq!(value["ID"], json!(7));
        assert_eq!(value["changed"], Value::Null);
        assert_eq!(value["rawRequest"], Value::Null);
        assert_eq!(value["type"], json!(0));
    }

    #[test]
    fn notification_priority_is_numeric() {
        let mut notification = Notification::new("ac-1", "hello");
        notification.priority = 3;
        let value = serde_json::to_value(notification.to_record()).unwrap();
        assert_eq!(value["priority"], json!(3));
        assert_eq!(value["responseTitle"], json!(""));
    }
}
