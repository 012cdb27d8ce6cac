//! Cross-kind read paths.
//!
//! # Responsibility
//! - Enrich assignments with callpoint and device views at read time.
//! - Walk action -> notifications -> events.
//!
//! # Invariants
//! - A missing callpoint or device leaves the matching view empty and emits
//!   `enrich_miss`; it is never an error.
//! - Any store error aborts the whole traversal; no partial result is returned.
//! - Events of one notification are ordered by `created`; notifications keep
//!   the order the store returned them in.

use crate::error::CoreResult;
use crate::model::assignment::Assignment;
use crate::model::callpoint::CallpointSummary;
use crate::model::device::DeviceSummary;
use crate::model::event::Event;
use crate::observe::OpContext;
use crate::repo::{
    AssignmentRepository, CallpointRepository, DeviceRepository, EventRepository,
    NotificationRepository,
};

const MODULE: &str = "resolver";

#[derive(Clone)]
pub struct RelationshipResolver {
    assignments: AssignmentRepository,
    callpoints: CallpointRepository,
    devices: DeviceRepository,
    notifications: NotificationRepository,
    events: EventRepository,
}

impl RelationshipResolver {
    pub fn new(
        assignments: AssignmentRepository,
        callpoints: CallpointRepository,
        devices: DeviceRepository,
        notifications: NotificationRepository,
        events: EventRepository,
    ) -> Self {
        Self {
            assignments,
            callpoints,
            devices,
            notifications,
            events,
        }
    }

    /// Assignments of one callpoint with `callpoint` and `device` views filled.
    ///
    /// Each view is copied from the first record matching the assignment's
    /// `cpID` / `dvID`.
    pub fn list_assignments_by_callpoint(
        &self,
        ctx: &OpContext,
        cp_id: &str,
    ) -> CoreResult<Vec<Assignment>> {
        let assignments = self.assignments.get_by_cp_id(ctx, cp_id)?;
        let (assignments, misses) = self.enrich(ctx, assignments)?;
        ctx.debug(
            MODULE,
            "list_assignments_by_callpoint",
            format_args!(
                "status=ok cp_id={cp_id} returned={} partial={misses}",
                assignments.len()
            ),
        );
        Ok(assignments)
    }

    /// Every assignment, oldest first, enriched like
    /// [`RelationshipResolver::list_assignments_by_callpoint`].
    pub fn list_all_assignments(&self, ctx: &OpContext) -> CoreResult<Vec<Assignment>> {
        let assignments = self.assignments.list_all(ctx)?;
        let (assignments, misses) = self.enrich(ctx, assignments)?;
        ctx.debug(
            MODULE,
            "list_all_assignments",
            format_args!("status=ok returned={} partial={misses}", assignments.len()),
        );
        Ok(assignments)
    }

    /// Every event of every notification spawned by `ac_id`.
    ///
    /// An action without notifications yields an empty list.
    pub fn list_events_by_action_id(&self, ctx: &OpContext, ac_id: &str) -> CoreResult<Vec<Event>> {
        let notifications = self.notifications.get_by_ac_id(ctx, ac_id)?;
        if notifications.is_empty() {
            ctx.debug(
                MODULE,
                "list_events_by_action_id",
                format_args!("status=ok ac_id={ac_id} notifications=0 returned=0"),
            );
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        for notification in &notifications {
            events.extend(self.events.get_by_nt_id(ctx, &notification.nt_id)?);
        }
        ctx.debug(
            MODULE,
            "list_events_by_action_id",
            format_args!(
                "status=ok ac_id={ac_id} notifications={} returned={}",
                notifications.len(),
                events.len()
            ),
        );
        Ok(events)
    }

    /// Events of one notification, oldest first.
    pub fn list_events_by_notification(
        &self,
        ctx: &OpContext,
        nt_id: &str,
    ) -> CoreResult<Vec<Event>> {
        self.events.get_by_nt_id(ctx, nt_id)
    }

    /// Events raised against one callpoint, oldest first.
    pub fn list_events_by_callpoint(&self, ctx: &OpContext, cp_id: &str) -> CoreResult<Vec<Event>> {
        self.events.get_by_cp_id(ctx, cp_id)
    }

    /// Fills both views; returns the records and how many stayed partial.
    fn enrich(
        &self,
        ctx: &OpContext,
        mut assignments: Vec<Assignment>,
    ) -> CoreResult<(Vec<Assignment>, usize)> {
        let mut misses = 0usize;
        for assignment in &mut assignments {
            assignment.callpoint = self.callpoint_view(ctx, assignment)?;
            assignment.device = self.device_view(ctx, assignment)?;
            if assignment.callpoint.is_empty() || assignment.device.is_empty() {
                misses += 1;
            }
        }
        Ok((assignments, misses))
    }

    fn callpoint_view(
        &self,
        ctx: &OpContext,
        assignment: &Assignment,
    ) -> CoreResult<CallpointSummary> {
        let found = self.callpoints.get_by_cp_id(ctx, &assignment.cp_id)?;
        match found.first() {
            Some(callpoint) => Ok(CallpointSummary::from(callpoint)),
            None => {
                report_miss(ctx, assignment, "callpoint", &assignment.cp_id);
                Ok(CallpointSummary::default())
            }
        }
    }

    fn device_view(&self, ctx: &OpContext, assignment: &Assignment) -> CoreResult<DeviceSummary> {
        let found = self.devices.get_by_dv_id(ctx, &assignment.dv_id)?;
        match found.first() {
            Some(device) => Ok(DeviceSummary::from(device)),
            None => {
                report_miss(ctx, assignment, "device", &assignment.dv_id);
                Ok(DeviceSummary::default())
            }
        }
    }
}

fn report_miss(ctx: &OpContext, assignment: &Assignment, target: &str, key: &str) {
    ctx.warn(
        MODULE,
        "enrich_miss",
        format_args!("as_id={} target={target} key={key}", assignment.as_id),
    );
}
