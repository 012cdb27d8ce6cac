//! In-process message broker for tests and local runs.
//!
//! Resources are named `projects/<project>/topics/<name>` and
//! `projects/<project>/subscriptions/<name>`.

use super::{
    BrokerError, BrokerResult, MessageBroker, SubscriptionHandle, SubscriptionSettings,
    TopicHandle,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct BrokerState {
    topics: BTreeSet<String>,
    subscriptions: BTreeMap<String, SubscriptionHandle>,
    topic_creations: usize,
    subscription_creations: usize,
}

#[derive(Debug)]
pub struct MemoryBroker {
    project: String,
    state: Mutex<BrokerState>,
}

impl MemoryBroker {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            state: Mutex::default(),
        }
    }

    /// Number of successful `create_topic` calls so far.
    pub fn topic_creations(&self) -> usize {
        self.lock().topic_creations
    }

    /// Number of successful `create_subscription` calls so far.
    pub fn subscription_creations(&self) -> usize {
        self.lock().subscription_creations
    }

    fn subscription_resource(&self, name: &str) -> String {
        format!("projects/{}/subscriptions/{name}", self.project)
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageBroker for MemoryBroker {
    fn topic(&self, name: &str) -> TopicHandle {
        TopicHandle {
            name: name.to_string(),
            resource: format!("projects/{}/topics/{name}", self.project),
        }
    }

    fn topic_exists(&self, topic: &TopicHandle) -> BrokerResult<bool> {
        Ok(self.lock().topics.contains(&topic.resource))
    }

    fn create_topic(&self, name: &str) -> BrokerResult<TopicHandle> {
        let topic = self.topic(name);
        let mut state = self.lock();
        if !state.topics.insert(topic.resource.clone()) {
            return Err(BrokerError::AlreadyExists {
                resource: "topic",
                name: topic.resource,
            });
        }
        state.topic_creations += 1;
        Ok(topic)
    }

    fn list_subscriptions(&self) -> BrokerResult<Vec<SubscriptionHandle>> {
        Ok(self.lock().subscriptions.values().cloned().collect())
    }

    fn create_subscription(
        &self,
        name: &str,
        topic: &TopicHandle,
        settings: &SubscriptionSettings,
    ) -> BrokerResult<SubscriptionHandle> {
        let resource = self.subscription_resource(name);
        let mut state = self.lock();
        if !state.topics.contains(&topic.resource) {
            return Err(BrokerError::NotFound {
                resource: "topic",
                name: topic.resource.clone(),
            });
        }
        if state.subscriptions.contains_key(&resource) {
            return Err(BrokerError::AlreadyExists {
                resource: "subscription",
                name: resource,
            });
        }
        let handle = SubscriptionHandle {
            resource: resource.clone(),
            topic: topic.resource.clone(),
            ack_deadline: settings.ack_deadline,
            retention: settings.retention,
        };
        state.subscriptions.insert(resource, handle.clone());
        state.subscription_creations += 1;
        Ok(handle)
    }

    fn delete_subscription(&self, name: &str) -> BrokerResult<()> {
        let resource = self.subscription_resource(name);
        match self.lock().subscriptions.remove(&resource) {
            Some(_) => Ok(()),
            None => Err(BrokerError::NotFound {
                resource: "subscription",
                name: resource,
            }),
        }
    }
}
