//! Action persistence.

use crate::error::CoreResult;
use crate::guard::UniquenessGuard;
use crate::model::action::Action;
use crate::model::{fields, EntityId};
use crate::observe::OpContext;

#[derive(Clone)]
pub struct ActionRepository {
    guard: UniquenessGuard,
}

impl ActionRepository {
    pub fn new(guard: UniquenessGuard) -> Self {
        Self { guard }
    }

    /// Registers a new action; `DuplicateKey` when `acID` already exists.
    pub fn add(&self, ctx: &OpContext, action: &Action) -> CoreResult<EntityId> {
        let record = Action {
            id: 0,
            ac_id: action.ac_id.clone(),
            cp_id: action.cp_id.clone(),
            action: action.action.clone(),
            description: action.description.clone(),
            created: Default::default(),
            raw_request: action.raw_request.clone(),
        };
        self.guard.add_if_absent(ctx, record)
    }

    pub fn get_by_ac_id(&self, ctx: &OpContext, ac_id: &str) -> CoreResult<Vec<Action>> {
        self.guard
            .gateway()
            .query_by_field(ctx, fields::AC_ID, ac_id)
    }

    /// All actions, oldest first.
    pub fn list_all(&self, ctx: &OpContext) -> CoreResult<Vec<Action>> {
        self.guard.gateway().query_all_ordered(ctx, fields::CREATED)
    }
}
