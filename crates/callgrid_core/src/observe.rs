//! Per-operation context: observability sink, request id and deadline.
//!
//! # Responsibility
//! - Carry an injectable [`Observer`] alongside every core operation, so
//!   core logic never reaches for a process-wide logger.
//! - Carry the caller's deadline; operations check it before each remote call.
//!
//! # Invariants
//! - Observers must not fail or block the operation that emits through them.
//! - An expired deadline aborts before the next remote call, never mid-call.

use crate::error::{CoreError, CoreResult};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Severity of an observed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// One structured diagnostic emitted by core code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub level: Level,
    pub request_id: String,
    pub module: &'static str,
    pub event: &'static str,
    /// Pre-formatted `key=value` pairs.
    pub detail: String,
}

impl Observation {
    /// Renders as `event=<event> module=<module> request_id=<id> <detail>`.
    pub fn render(&self) -> String {
        let mut line = format!(
            "event={} module={} request_id={}",
            self.event, self.module, self.request_id
        );
        if !self.detail.is_empty() {
            line.push(' ');
            line.push_str(&self.detail);
        }
        line
    }
}

/// Sink for core diagnostics.
pub trait Observer: Send + Sync {
    fn observe(&self, observation: &Observation);
}

/// Forwards observations to the `log` facade under target `callgrid`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn observe(&self, observation: &Observation) {
        let level = match observation.level {
            Level::Debug => log::Level::Debug,
            Level::Info => log::Level::Info,
            Level::Warn => log::Level::Warn,
            Level::Error => log::Level::Error,
        };
        log::log!(target: "callgrid", level, "{}", observation.render());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&self, _observation: &Observation) {}
}

/// Keeps observations in memory; used by tests and diagnostics tooling.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    records: Mutex<Vec<Observation>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Observation> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Observations whose event name matches `event`.
    pub fn events_named(&self, event: &str) -> Vec<Observation> {
        self.records()
            .into_iter()
            .filter(|record| record.event == event)
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, observation: &Observation) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(observation.clone());
    }
}

/// Context passed to every core operation.
#[derive(Clone)]
pub struct OpContext {
    request_id: String,
    deadline: Option<Instant>,
    observer: Arc<dyn Observer>,
}

impl OpContext {
    /// Context with a fresh request id, no deadline, reporting to `observer`.
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self {
            request_id: Uuid::new_v4().simple().to_string(),
            deadline: None,
            observer,
        }
    }

    /// Context reporting through the `log` facade.
    pub fn logged() -> Self {
        Self::new(Arc::new(LogObserver))
    }

    /// Context that drops all diagnostics.
    pub fn silent() -> Self {
        Self::new(Arc::new(NoopObserver))
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails with `DeadlineExceeded` when the deadline has passed.
    pub fn check_deadline(&self, operation: &'static str) -> CoreResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.emit(
                    Level::Warn,
                    "context",
                    "deadline_exceeded",
                    format_args!("status=error operation={operation}"),
                );
                Err(CoreError::DeadlineExceeded { operation })
            }
            _ => Ok(()),
        }
    }

    pub fn emit(
        &self,
        level: Level,
        module: &'static str,
        event: &'static str,
        detail: impl Display,
    ) {
        self.observer.observe(&Observation {
            level,
            request_id: self.request_id.clone(),
            module,
            event,
            detail: detail.to_string(),
        });
    }

    pub fn debug(&self, module: &'static str, event: &'static str, detail: impl Display) {
        self.emit(Level::Debug, module, event, detail);
    }

    pub fn info(&self, module: &'static str, event: &'static str, detail: impl Display) {
        self.emit(Level::Info, module, event, detail);
    }

    pub fn warn(&self, module: &'static str, event: &'static str, detail: impl Display) {
        self.emit(Level::Warn, module, event, detail);
    }
}

impl std::fmt::Debug for OpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpContext")
            .field("request_id", &self.request_id)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Level, OpContext, RecordingObserver};
    use crate::error::CoreError;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn expired_deadline_is_reported_and_rejected() {
        let observer = Arc::new(RecordingObserver::new());
        let ctx = OpContext::new(observer.clone())
            .with_request_id("req-1")
            .with_deadline(Instant::now() - Duration::from_millis(1));

        let err = ctx.check_deadline("store_query").unwrap_err();
        assert!(matches!(
            err,
            CoreError::DeadlineExceeded {
                operation: "store_query"
            }
        ));

        let records = observer.events_named("deadline_exceeded");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(
            records[0].render(),
            "event=deadline_exceeded module=context request_id=req-1 status=error operation=store_query"
        );
    }

    #[test]
    fn open_deadline_passes() {
        let ctx = OpContext::silent().with_timeout(Duration::from_secs(60));
        ctx.check_deadline("store_query").unwrap();
        assert!(OpContext::silent().check_deadline("store_query").is_ok());
    }
}
