//! Message broker abstraction and idempotent provisioning.
//!
//! # Responsibility
//! - Define the broker primitives the platform needs: topic exists/create,
//!   list/create/delete pull subscriptions.
//! - Provide [`MessagingProvisioner`] for create-or-reuse at start-up.

pub mod memory;
pub mod provisioner;

use std::time::Duration;
use thiserror::Error;

pub use memory::MemoryBroker;
pub use provisioner::MessagingProvisioner;

pub type BrokerResult<T> = Result<T, BrokerError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("{resource} `{name}` not found")]
    NotFound { resource: &'static str, name: String },
    #[error("{resource} `{name}` already exists")]
    AlreadyExists { resource: &'static str, name: String },
    /// Transport-level failure reported by the provider.
    #[error("message broker unavailable: {0}")]
    Unavailable(String),
}

/// Handle to a publish topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicHandle {
    /// Short topic name as requested by callers.
    pub name: String,
    /// Provider-qualified resource name.
    pub resource: String,
}

/// Creation parameters for pull subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionSettings {
    pub ack_deadline: Duration,
    pub retention: Duration,
}

/// Handle to a pull subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    /// Provider-qualified resource name.
    pub resource: String,
    /// Provider-qualified topic resource the subscription is bound to.
    pub topic: String,
    pub ack_deadline: Duration,
    pub retention: Duration,
}

impl SubscriptionHandle {
    /// True when the resource name ends with `name`.
    ///
    /// Plain suffix match: `team-sub-a` also answers to `sub-a`. An empty
    /// name matches nothing.
    pub fn matches_name(&self, name: &str) -> bool {
        !name.is_empty() && self.resource.ends_with(name)
    }
}

/// Primitive operations of the message broker.
pub trait MessageBroker: Send + Sync {
    /// Local handle for a topic name; no I/O.
    fn topic(&self, name: &str) -> TopicHandle;

    fn topic_exists(&self, topic: &TopicHandle) -> BrokerResult<bool>;

    fn create_topic(&self, name: &str) -> BrokerResult<TopicHandle>;

    /// Every subscription in the project.
    fn list_subscriptions(&self) -> BrokerResult<Vec<SubscriptionHandle>>;

    fn create_subscription(
        &self,
        name: &str,
        topic: &TopicHandle,
        settings: &SubscriptionSettings,
    ) -> BrokerResult<SubscriptionHandle>;

    /// Deletes by name; a missing subscription is `BrokerError::NotFound`.
    fn delete_subscription(&self, name: &str) -> BrokerResult<()>;
}
