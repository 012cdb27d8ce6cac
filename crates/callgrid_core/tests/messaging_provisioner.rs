use callgrid_core::messaging::{
    BrokerResult, MessageBroker, SubscriptionHandle, SubscriptionSettings, TopicHandle,
};
use callgrid_core::{
    BrokerError, CallgridConfig, CoreError, MemoryBroker, MessagingProvisioner, OpContext,
    RecordingObserver,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn provisioner(broker: Arc<MemoryBroker>) -> MessagingProvisioner<MemoryBroker> {
    MessagingProvisioner::from_config(broker, &CallgridConfig::default().messaging)
}

#[test]
fn ensure_topic_creates_once() {
    let broker = Arc::new(MemoryBroker::new("site-a"));
    let provisioner = provisioner(broker.clone());
    let ctx = OpContext::silent();

    let first = provisioner.ensure_topic(&ctx, "notifications").unwrap();
    let second = provisioner.ensure_topic(&ctx, "notifications").unwrap();

    assert_eq!(first, second);
    assert_eq!(first.resource, "projects/site-a/topics/notifications");
    assert_eq!(broker.topic_creations(), 1);
}

#[test]
fn ensure_subscription_reuses_the_existing_handle() {
    let broker = Arc::new(MemoryBroker::new("site-a"));
    let provisioner = provisioner(broker.clone());
    let observer = Arc::new(RecordingObserver::new());
    let ctx = OpContext::new(observer.clone());

    let topic = provisioner.ensure_topic(&ctx, "notifications").unwrap();
    let first = provisioner
        .ensure_subscription(&ctx, "notifications-pull", &topic)
        .unwrap();
    let second = provisioner
        .ensure_subscription(&ctx, "notifications-pull", &topic)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(broker.subscription_creations(), 1);
    assert_eq!(first.topic, topic.resource);

    let outcomes: Vec<_> = observer
        .events_named("ensure_subscription")
        .into_iter()
        .map(|record| record.detail)
        .collect();
    assert!(outcomes[0].contains("outcome=created"));
    assert!(outcomes[1].contains("outcome=existing"));
}

#[test]
fn subscriptions_use_configured_settings() {
    let mut config = CallgridConfig::default();
    config.messaging.retention_secs = 48 * 60 * 60;
    let broker = Arc::new(MemoryBroker::new("site-a"));
    let provisioner = MessagingProvisioner::from_config(broker, &config.messaging);
    let ctx = OpContext::silent();

    let topic = provisioner.ensure_topic(&ctx, "notifications").unwrap();
    let subscription = provisioner
        .ensure_subscription(&ctx, "notifications-pull", &topic)
        .unwrap();

    assert_eq!(subscription.ack_deadline, Duration::from_secs(600));
    assert_eq!(subscription.retention, Duration::from_secs(48 * 60 * 60));
}

#[test]
fn default_settings_keep_one_hour_retention() {
    let provisioner = provisioner(Arc::new(MemoryBroker::new("site-a")));
    assert_eq!(
        provisioner.settings(),
        &SubscriptionSettings {
            ack_deadline: Duration::from_secs(600),
            retention: Duration::from_secs(3600),
        }
    );
}

#[test]
fn subscription_whose_name_ends_with_the_request_is_reused() {
    let broker = Arc::new(MemoryBroker::new("site-a"));
    let provisioner = provisioner(broker.clone());
    let ctx = OpContext::silent();

    let topic = provisioner.ensure_topic(&ctx, "notifications").unwrap();
    let team = provisioner
        .ensure_subscription(&ctx, "team-sub-a", &topic)
        .unwrap();
    let reused = provisioner
        .ensure_subscription(&ctx, "sub-a", &topic)
        .unwrap();

    assert_eq!(reused, team);
    assert_eq!(reused.resource, "projects/site-a/subscriptions/team-sub-a");
    assert_eq!(broker.subscription_creations(), 1);
}

#[test]
fn ensure_configured_provisions_configured_names_once() {
    let mut config = CallgridConfig::default();
    config.messaging.topic = "alerts".to_string();
    config.messaging.subscription = "alerts-pull".to_string();
    let broker = Arc::new(MemoryBroker::new("site-a"));
    let provisioner = MessagingProvisioner::from_config(broker.clone(), &config.messaging);
    let ctx = OpContext::silent();

    let (topic, subscription) = provisioner
        .ensure_configured(&ctx, &config.messaging)
        .unwrap();
    let again = provisioner
        .ensure_configured(&ctx, &config.messaging)
        .unwrap();

    assert_eq!(topic.resource, "projects/site-a/topics/alerts");
    assert_eq!(subscription.resource, "projects/site-a/subscriptions/alerts-pull");
    assert_eq!(subscription.topic, topic.resource);
    assert_eq!(again, (topic, subscription));
    assert_eq!(broker.topic_creations(), 1);
    assert_eq!(broker.subscription_creations(), 1);
}

#[test]
fn subscription_on_missing_topic_fails() {
    let broker = Arc::new(MemoryBroker::new("site-a"));
    let provisioner = provisioner(broker.clone());
    let topic = broker.topic("never-created");

    let err = provisioner
        .ensure_subscription(&OpContext::silent(), "orphan-pull", &topic)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Broker(BrokerError::NotFound {
            resource: "topic",
            ..
        })
    ));
}

#[test]
fn deleting_a_missing_subscription_is_not_found() {
    let broker = Arc::new(MemoryBroker::new("site-a"));
    let provisioner = provisioner(broker);
    let ctx = OpContext::silent();

    let topic = provisioner.ensure_topic(&ctx, "notifications").unwrap();
    provisioner
        .ensure_subscription(&ctx, "notifications-pull", &topic)
        .unwrap();
    provisioner
        .delete_subscription(&ctx, "notifications-pull")
        .unwrap();

    let err = provisioner
        .delete_subscription(&ctx, "notifications-pull")
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Broker(BrokerError::NotFound {
            resource: "subscription",
            ..
        })
    ));
    assert!(provisioner.list_subscriptions(&ctx).unwrap().is_empty());
}

/// Broker that reports a topic as absent once, then loses the create race.
struct RacingBroker {
    inner: MemoryBroker,
    raced: AtomicBool,
}

impl MessageBroker for RacingBroker {
    fn topic(&self, name: &str) -> TopicHandle {
        self.inner.topic(name)
    }

    fn topic_exists(&self, topic: &TopicHandle) -> BrokerResult<bool> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.create_topic(&topic.name)?;
            return Ok(false);
        }
        self.inner.topic_exists(topic)
    }

    fn create_topic(&self, name: &str) -> BrokerResult<TopicHandle> {
        self.inner.create_topic(name)
    }

    fn list_subscriptions(&self) -> BrokerResult<Vec<SubscriptionHandle>> {
        self.inner.list_subscriptions()
    }

    fn create_subscription(
        &self,
        name: &str,
        topic: &TopicHandle,
        settings: &SubscriptionSettings,
    ) -> BrokerResult<SubscriptionHandle> {
        self.inner.create_subscription(name, topic, settings)
    }

    fn delete_subscription(&self, name: &str) -> BrokerResult<()> {
        self.inner.delete_subscription(name)
    }
}

#[test]
fn losing_the_topic_create_race_counts_as_present() {
    let broker = Arc::new(RacingBroker {
        inner: MemoryBroker::new("site-a"),
        raced: AtomicBool::new(false),
    });
    let provisioner =
        MessagingProvisioner::from_config(broker.clone(), &CallgridConfig::default().messaging);

    let topic = provisioner
        .ensure_topic(&OpContext::silent(), "notifications")
        .unwrap();
    assert_eq!(topic.resource, "projects/site-a/topics/notifications");
    assert_eq!(broker.inner.topic_creations(), 1);
}
