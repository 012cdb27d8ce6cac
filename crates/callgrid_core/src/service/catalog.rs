//! One-stop wiring of repositories and resolver over a single store.
//!
//! # Responsibility
//! - Build every repository from one [`DocumentStore`], clock and config.
//! - Export any kind as a JSON array by name.
//!
//! # Invariants
//! - All repositories share the same gateway, clock and uniqueness mode.
//! - Assignment export is always enriched.

use crate::clock::{Clock, MonotonicClock};
use crate::config::CallgridConfig;
use crate::error::CoreResult;
use crate::export::export_json;
use crate::guard::UniquenessGuard;
use crate::model::Kind;
use crate::observe::OpContext;
use crate::repo::{
    ActionRepository, AssignmentRepository, CallpointRepository, DeviceRepository,
    EventRepository, NotificationRepository,
};
use crate::service::resolver::RelationshipResolver;
use crate::store::{DocumentStore, StoreGateway};
use std::sync::Arc;

#[derive(Clone)]
pub struct Catalog {
    actions: ActionRepository,
    assignments: AssignmentRepository,
    callpoints: CallpointRepository,
    devices: DeviceRepository,
    notifications: NotificationRepository,
    events: EventRepository,
}

impl Catalog {
    /// Catalog stamping records with a [`MonotonicClock`].
    pub fn new(store: Arc<dyn DocumentStore>, config: &CallgridConfig) -> Self {
        Self::with_clock(store, config, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        store: Arc<dyn DocumentStore>,
        config: &CallgridConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gateway = StoreGateway::new(store);
        let guard = UniquenessGuard::new(gateway.clone(), Arc::clone(&clock), config.uniqueness);
        Self {
            actions: ActionRepository::new(guard.clone()),
            assignments: AssignmentRepository::new(guard.clone()),
            callpoints: CallpointRepository::new(guard.clone()),
            devices: DeviceRepository::new(guard),
            notifications: NotificationRepository::new(gateway.clone(), Arc::clone(&clock)),
            events: EventRepository::new(gateway, clock, config.events.sub_type_suffix.clone()),
        }
    }

    pub fn actions(&self) -> &ActionRepository {
        &self.actions
    }

    pub fn assignments(&self) -> &AssignmentRepository {
        &self.assignments
    }

    pub fn callpoints(&self) -> &CallpointRepository {
        &self.callpoints
    }

    pub fn devices(&self) -> &DeviceRepository {
        &self.devices
    }

    pub fn notifications(&self) -> &NotificationRepository {
        &self.notifications
    }

    pub fn events(&self) -> &EventRepository {
        &self.events
    }

    pub fn resolver(&self) -> RelationshipResolver {
        RelationshipResolver::new(
            self.assignments.clone(),
            self.callpoints.clone(),
            self.devices.clone(),
            self.notifications.clone(),
            self.events.clone(),
        )
    }

    /// Every record of `kind`, oldest first, rendered as a JSON array.
    pub fn export_kind(&self, ctx: &OpContext, kind: Kind) -> CoreResult<String> {
        match kind {
            Kind::Actions => export_json(&self.actions.list_all(ctx)?),
            Kind::Assignments => export_json(&self.resolver().list_all_assignments(ctx)?),
            Kind::Callpoints => export_json(&self.callpoints.list_all(ctx)?),
            Kind::Devices => export_json(&self.devices.list_all(ctx)?),
            Kind::Notifications => export_json(&self.notifications.list_all(ctx)?),
            Kind::Events => export_json(&self.events.list_all(ctx)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Catalog;
    use crate::clock::ManualClock;
    use crate::config::CallgridConfig;
    use crate::model::callpoint::Callpoint;
    use crate::model::Kind;
    use crate::observe::OpContext;
    use crate::store::MemoryDocumentStore;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::Value;
    use std::sync::Arc;

    #[test]
    fn export_kind_lists_records_oldest_first() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let catalog = Catalog::with_clock(
            Arc::new(MemoryDocumentStore::new()),
            &CallgridConfig::default(),
            Arc::new(ManualClock::stepping(start, Duration::seconds(1))),
        );
        let ctx = OpContext::silent();
        catalog
            .callpoints()
            .add(&ctx, &Callpoint::new("cp-b", "Second"))
            .unwrap();
        catalog
            .callpoints()
            .add(&ctx, &Callpoint::new("cp-a", "First"))
            .unwrap();

        let text = catalog.export_kind(&ctx, Kind::Callpoints).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|record| record["cpID"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["cp-b", "cp-a"]);
    }
}
