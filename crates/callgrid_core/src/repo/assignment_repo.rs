//! Assignment persistence (without enrichment; see the resolver).

use crate::error::CoreResult;
use crate::guard::UniquenessGuard;
use crate::model::assignment::Assignment;
use crate::model::{fields, EntityId};
use crate::observe::OpContext;

#[derive(Clone)]
pub struct AssignmentRepository {
    guard: UniquenessGuard,
}

impl AssignmentRepository {
    pub fn new(guard: UniquenessGuard) -> Self {
        Self { guard }
    }

    /// Registers a new assignment; `DuplicateKey` when `asID` already exists.
    ///
    /// `cpID`/`dvID` are stored as given; their targets are not checked.
    pub fn add(&self, ctx: &OpContext, assignment: &Assignment) -> CoreResult<EntityId> {
        let record = Assignment {
            as_id: assignment.as_id.clone(),
            description: assignment.description.clone(),
            cp_id: assignment.cp_id.clone(),
            dv_id: assignment.dv_id.clone(),
            level: assignment.level,
            settings: assignment.settings.clone(),
            raw_request: assignment.raw_request.clone(),
            ..Assignment::default()
        };
        self.guard.add_if_absent(ctx, record)
    }

    pub fn get_by_as_id(&self, ctx: &OpContext, as_id: &str) -> CoreResult<Vec<Assignment>> {
        self.guard
            .gateway()
            .query_by_field(ctx, fields::AS_ID, as_id)
    }

    /// Raw assignments for one callpoint, without callpoint/device views.
    pub fn get_by_cp_id(&self, ctx: &OpContext, cp_id: &str) -> CoreResult<Vec<Assignment>> {
        self.guard
            .gateway()
            .query_by_field(ctx, fields::CP_ID, cp_id)
    }

    /// All assignments, oldest first.
    pub fn list_all(&self, ctx: &OpContext) -> CoreResult<Vec<Assignment>> {
        self.guard.gateway().query_all_ordered(ctx, fields::CREATED)
    }
}
