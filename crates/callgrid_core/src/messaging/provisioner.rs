//! Idempotent create-or-reuse of the publish topic and pull subscription.
//!
//! # Invariants
//! - `ensure_topic` creates at most once per absent topic; a concurrent
//!   creator winning the race is treated as "present".
//! - `ensure_subscription` reuses any subscription whose resource name ends
//!   with `name` and only creates when none exists.
//! - Deletion is a pass-through; not-found is surfaced, never swallowed.

use super::{
    BrokerError, MessageBroker, SubscriptionHandle, SubscriptionSettings, TopicHandle,
};
use crate::config::MessagingConfig;
use crate::error::CoreResult;
use crate::observe::OpContext;
use std::sync::Arc;

const MODULE: &str = "messaging";

pub struct MessagingProvisioner<B: MessageBroker + ?Sized> {
    broker: Arc<B>,
    settings: SubscriptionSettings,
}

impl<B: MessageBroker + ?Sized> MessagingProvisioner<B> {
    pub fn new(broker: Arc<B>, settings: SubscriptionSettings) -> Self {
        Self { broker, settings }
    }

    /// Provisioner using the ack deadline and retention from `config`.
    pub fn from_config(broker: Arc<B>, config: &MessagingConfig) -> Self {
        Self::new(broker, config.subscription_settings())
    }

    pub fn settings(&self) -> &SubscriptionSettings {
        &self.settings
    }

    /// Returns the topic, creating it when absent.
    pub fn ensure_topic(&self, ctx: &OpContext, name: &str) -> CoreResult<TopicHandle> {
        ctx.check_deadline("topic_exists")?;
        let topic = self.broker.topic(name);
        if self.broker.topic_exists(&topic)? {
            ctx.debug(
                MODULE,
                "ensure_topic",
                format_args!("status=ok outcome=existing topic={}", topic.resource),
            );
            return Ok(topic);
        }

        ctx.check_deadline("create_topic")?;
        match self.broker.create_topic(name) {
            Ok(created) => {
                ctx.info(
                    MODULE,
                    "ensure_topic",
                    format_args!("status=ok outcome=created topic={}", created.resource),
                );
                Ok(created)
            }
            Err(BrokerError::AlreadyExists { .. }) => {
                ctx.debug(
                    MODULE,
                    "ensure_topic",
                    format_args!("status=ok outcome=raced topic={}", topic.resource),
                );
                Ok(topic)
            }
            Err(err) => {
                ctx.warn(
                    MODULE,
                    "ensure_topic",
                    format_args!("status=error topic={name} error={err}"),
                );
                Err(err.into())
            }
        }
    }

    /// Returns the subscription named `name`, creating it on `topic` when absent.
    pub fn ensure_subscription(
        &self,
        ctx: &OpContext,
        name: &str,
        topic: &TopicHandle,
    ) -> CoreResult<SubscriptionHandle> {
        if let Some(existing) = self.find_subscription(ctx, name)? {
            ctx.debug(
                MODULE,
                "ensure_subscription",
                format_args!(
                    "status=ok outcome=existing subscription={}",
                    existing.resource
                ),
            );
            return Ok(existing);
        }

        ctx.check_deadline("create_subscription")?;
        match self
            .broker
            .create_subscription(name, topic, &self.settings)
        {
            Ok(created) => {
                ctx.info(
                    MODULE,
                    "ensure_subscription",
                    format_args!(
                        "status=ok outcome=created subscription={} topic={} ack_deadline_s={} retention_s={}",
                        created.resource,
                        created.topic,
                        created.ack_deadline.as_secs(),
                        created.retention.as_secs()
                    ),
                );
                Ok(created)
            }
            Err(BrokerError::AlreadyExists { resource, name: existing }) => {
                match self.find_subscription(ctx, name)? {
                    Some(raced) => Ok(raced),
                    None => Err(BrokerError::AlreadyExists {
                        resource,
                        name: existing,
                    }
                    .into()),
                }
            }
            Err(err) => {
                ctx.warn(
                    MODULE,
                    "ensure_subscription",
                    format_args!("status=error subscription={name} error={err}"),
                );
                Err(err.into())
            }
        }
    }

    /// Start-up provisioning: the configured topic, then the configured
    /// subscription bound to it.
    pub fn ensure_configured(
        &self,
        ctx: &OpContext,
        config: &MessagingConfig,
    ) -> CoreResult<(TopicHandle, SubscriptionHandle)> {
        let topic = self.ensure_topic(ctx, &config.topic)?;
        let subscription = self.ensure_subscription(ctx, &config.subscription, &topic)?;
        Ok((topic, subscription))
    }

    /// Every subscription in the project.
    pub fn list_subscriptions(&self, ctx: &OpContext) -> CoreResult<Vec<SubscriptionHandle>> {
        ctx.check_deadline("list_subscriptions")?;
        Ok(self.broker.list_subscriptions()?)
    }

    /// Deletes the subscription; `BrokerError::NotFound` when it does not exist.
    pub fn delete_subscription(&self, ctx: &OpContext, name: &str) -> CoreResult<()> {
        ctx.check_deadline("delete_subscription")?;
        match self.broker.delete_subscription(name) {
            Ok(()) => {
                ctx.info(
                    MODULE,
                    "delete_subscription",
                    format_args!("status=ok subscription={name}"),
                );
                Ok(())
            }
            Err(err) => {
                ctx.warn(
                    MODULE,
                    "delete_subscription",
                    format_args!("status=error subscription={name} error={err}"),
                );
                Err(err.into())
            }
        }
    }

    fn find_subscription(
        &self,
        ctx: &OpContext,
        name: &str,
    ) -> CoreResult<Option<SubscriptionHandle>> {
        Ok(self
            .list_subscriptions(ctx)?
            .into_iter()
            .find(|subscription| subscription.matches_name(name)))
    }
}
