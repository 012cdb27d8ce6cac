//! Device persistence.
//!
//! Deleting a device does not touch assignments that reference it.

use crate::error::CoreResult;
use crate::guard::UniquenessGuard;
use crate::model::device::Device;
use crate::model::{fields, EntityId, Kind};
use crate::observe::OpContext;

#[derive(Clone)]
pub struct DeviceRepository {
    guard: UniquenessGuard,
}

impl DeviceRepository {
    pub fn new(guard: UniquenessGuard) -> Self {
        Self { guard }
    }

    /// Registers a new device; `DuplicateKey` when `dvID` already exists.
    pub fn add(&self, ctx: &OpContext, device: &Device) -> CoreResult<EntityId> {
        let record = Device {
            id: 0,
            dv_id: device.dv_id.clone(),
            created: Default::default(),
            changed: None,
            label: device.label.clone(),
            description: device.description.clone(),
            kind: device.kind,
            priority: device.priority,
            icon: device.icon.clone(),
            is_two_way: device.is_two_way,
            category: device.category.clone(),
            destination: device.destination.clone(),
            settings: device.settings.clone(),
            raw_request: device.raw_request.clone(),
        };
        self.guard.add_if_absent(ctx, record)
    }

    pub fn get_by_dv_id(&self, ctx: &OpContext, dv_id: &str) -> CoreResult<Vec<Device>> {
        self.guard
            .gateway()
            .query_by_field(ctx, fields::DV_ID, dv_id)
    }

    /// All devices, oldest first.
    pub fn list_all(&self, ctx: &OpContext) -> CoreResult<Vec<Device>> {
        self.guard.gateway().query_all_ordered(ctx, fields::CREATED)
    }

    /// Deletes by store id. Dependent assignments are left in place.
    pub fn delete(&self, ctx: &OpContext, id: EntityId) -> CoreResult<()> {
        self.guard.gateway().delete_by_id(ctx, Kind::Devices, id)
    }
}
