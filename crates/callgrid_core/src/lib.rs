//! Core data-access layer for the callgrid notification platform.
//! This crate is the single source of truth for entity invariants.

pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod guard;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod observe;
pub mod repo;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{CallgridConfig, ConfigError, EventConfig, MessagingConfig};
pub use error::{CoreError, CoreResult};
pub use export::{export_json, to_json_array, Exportable};
pub use guard::{UniquenessGuard, UniquenessMode};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use messaging::{
    BrokerError, MemoryBroker, MessageBroker, MessagingProvisioner, SubscriptionHandle,
    SubscriptionSettings, TopicHandle,
};
pub use model::{Entity, EntityId, Kind, NaturalKeyed};
pub use observe::{LogObserver, NoopObserver, Observer, OpContext, RecordingObserver};
pub use service::{Catalog, RelationshipResolver};
pub use store::{
    DocumentStore, MemoryDocumentStore, SqliteDocumentStore, StoreError, StoreGateway,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
