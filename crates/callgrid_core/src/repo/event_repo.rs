//! Event persistence.

use crate::clock::Clock;
use crate::error::CoreResult;
use crate::model::event::Event;
use crate::model::fields;
use crate::observe::OpContext;
use crate::store::StoreGateway;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct EventRepository {
    gateway: StoreGateway,
    clock: Arc<dyn Clock>,
    sub_type_suffix: Option<String>,
}

impl EventRepository {
    /// `sub_type_suffix`, when set, is appended to every stored `evSubType`.
    pub fn new(
        gateway: StoreGateway,
        clock: Arc<dyn Clock>,
        sub_type_suffix: Option<String>,
    ) -> Self {
        Self {
            gateway,
            clock,
            sub_type_suffix,
        }
    }

    /// Appends a new event under a freshly generated `evID`.
    pub fn add(&self, ctx: &OpContext, event: &Event) -> CoreResult<Event> {
        let ev_sub_type = match &self.sub_type_suffix {
            Some(suffix) => format!("{}{suffix}", event.ev_sub_type),
            None => event.ev_sub_type.clone(),
        };
        let mut record = Event {
            id: 0,
            ev_id: Uuid::new_v4().to_string(),
            nt_id: event.nt_id.clone(),
            cp_id: event.cp_id.clone(),
            dv_id: event.dv_id.clone(),
            visibility: event.visibility.clone(),
            ev_type: event.ev_type.clone(),
            ev_sub_type,
            ev_description: event.ev_description.clone(),
            created: self.clock.now(),
        };
        record.id = self.gateway.insert(ctx, &record)?;
        Ok(record)
    }

    pub fn get_by_cp_id(&self, ctx: &OpContext, cp_id: &str) -> CoreResult<Vec<Event>> {
        self.gateway
            .query_by_field_ordered(ctx, fields::CP_ID, cp_id, fields::CREATED)
    }

    /// Events of one notification, oldest first.
    pub fn get_by_nt_id(&self, ctx: &OpContext, nt_id: &str) -> CoreResult<Vec<Event>> {
        self.gateway
            .query_by_field_ordered(ctx, fields::NT_ID, nt_id, fields::CREATED)
    }

    /// All events, oldest first.
    pub fn list_all(&self, ctx: &OpContext) -> CoreResult<Vec<Event>> {
        self.gateway.query_all_ordered(ctx, fields::CREATED)
    }
}
