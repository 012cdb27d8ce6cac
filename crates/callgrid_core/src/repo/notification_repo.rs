//! Notification persistence.

use crate::clock::Clock;
use crate::error::CoreResult;
use crate::model::fields;
use crate::model::notification::Notification;
use crate::observe::OpContext;
use crate::store::StoreGateway;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct NotificationRepository {
    gateway: StoreGateway,
    clock: Arc<dyn Clock>,
}

impl NotificationRepository {
    pub fn new(gateway: StoreGateway, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }

    /// Stores a new notification under a freshly generated `ntID`.
    ///
    /// Returns the stored record with `id`, `ntID` and `created` populated.
    pub fn add(&self, ctx: &OpContext, notification: &Notification) -> CoreResult<Notification> {
        let mut record = Notification {
            id: 0,
            nt_id: Uuid::new_v4().to_string(),
            ac_id: notification.ac_id.clone(),
            priority: notification.priority,
            category: notification.category.clone(),
            destination: notification.destination.clone(),
            message: notification.message.clone(),
            response_title: notification.response_title.clone(),
            options: notification.options.clone(),
            created: self.clock.now(),
        };
        record.id = self.gateway.insert(ctx, &record)?;
        Ok(record)
    }

    /// Notifications spawned by one action, in store (insertion) order.
    pub fn get_by_ac_id(&self, ctx: &OpContext, ac_id: &str) -> CoreResult<Vec<Notification>> {
        self.gateway.query_by_field(ctx, fields::AC_ID, ac_id)
    }

    /// All notifications, oldest first.
    pub fn list_all(&self, ctx: &OpContext) -> CoreResult<Vec<Notification>> {
        self.gateway.query_all_ordered(ctx, fields::CREATED)
    }
}
