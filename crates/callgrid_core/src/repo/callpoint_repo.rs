//! Callpoint persistence.
//!
//! Deleting a callpoint does not touch assignments that reference it; those
//! enrich to an empty callpoint view afterwards.

use crate::error::CoreResult;
use crate::guard::UniquenessGuard;
use crate::model::callpoint::Callpoint;
use crate::model::{fields, EntityId, Kind};
use crate::observe::OpContext;

#[derive(Clone)]
pub struct CallpointRepository {
    guard: UniquenessGuard,
}

impl CallpointRepository {
    pub fn new(guard: UniquenessGuard) -> Self {
        Self { guard }
    }

    /// Registers a new callpoint; `DuplicateKey` when `cpID` already exists.
    pub fn add(&self, ctx: &OpContext, callpoint: &Callpoint) -> CoreResult<EntityId> {
        let record = Callpoint {
            id: 0,
            cp_id: callpoint.cp_id.clone(),
            created: Default::default(),
            changed: None,
            abs_address: callpoint.abs_address.clone(),
            label: callpoint.label.clone(),
            description: callpoint.description.clone(),
            kind: callpoint.kind,
            priority: callpoint.priority,
            icon: callpoint.icon.clone(),
            raw_request: callpoint.raw_request.clone(),
        };
        self.guard.add_if_absent(ctx, record)
    }

    pub fn get_by_cp_id(&self, ctx: &OpContext, cp_id: &str) -> CoreResult<Vec<Callpoint>> {
        self.guard
            .gateway()
            .query_by_field(ctx, fields::CP_ID, cp_id)
    }

    /// All callpoints, oldest first.
    pub fn list_all(&self, ctx: &OpContext) -> CoreResult<Vec<Callpoint>> {
        self.guard.gateway().query_all_ordered(ctx, fields::CREATED)
    }

    /// Deletes by store id. Dependent assignments are left in place.
    pub fn delete(&self, ctx: &OpContext, id: EntityId) -> CoreResult<()> {
        self.guard.gateway().delete_by_id(ctx, Kind::Callpoints, id)
    }
}
