//! Runtime configuration.
//!
//! # Responsibility
//! - Hold every deployment-dependent constant in one typed document.
//! - Load it from JSON and validate bounds before use.
//!
//! # Invariants
//! - Subscription retention and ack deadline are explicit values; the
//!   defaults are 1 hour and 600 seconds.
//! - The event sub-type suffix is off unless configured.

use crate::guard::UniquenessMode;
use crate::messaging::SubscriptionSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Ack deadline applied to new subscriptions unless configured otherwise.
pub const DEFAULT_ACK_DEADLINE_SECS: u64 = 600;
/// Retention applied to new subscriptions unless configured otherwise.
pub const DEFAULT_RETENTION_SECS: u64 = 60 * 60;

const MIN_ACK_DEADLINE_SECS: u64 = 10;
const MAX_ACK_DEADLINE_SECS: u64 = 600;
const MIN_RETENTION_SECS: u64 = 10 * 60;
const MAX_RETENTION_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallgridConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    pub uniqueness: UniquenessMode,
    pub messaging: MessagingConfig,
    pub events: EventConfig,
}

impl Default for CallgridConfig {
    fn default() -> Self {
        Self {
            log_level: crate::logging::default_log_level().to_string(),
            uniqueness: UniquenessMode::default(),
            messaging: MessagingConfig::default(),
            events: EventConfig::default(),
        }
    }
}

impl CallgridConfig {
    /// Parses and validates a JSON config document. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::logging::normalize_level(&self.log_level)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        self.messaging.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagingConfig {
    pub topic: String,
    pub subscription: String,
    pub ack_deadline_secs: u64,
    pub retention_secs: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            topic: "notifications".to_string(),
            subscription: "notifications-pull".to_string(),
            ack_deadline_secs: DEFAULT_ACK_DEADLINE_SECS,
            retention_secs: DEFAULT_RETENTION_SECS,
        }
    }
}

impl MessagingConfig {
    pub fn ack_deadline(&self) -> Duration {
        Duration::from_secs(self.ack_deadline_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn subscription_settings(&self) -> SubscriptionSettings {
        SubscriptionSettings {
            ack_deadline: self.ack_deadline(),
            retention: self.retention(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::Invalid("messaging.topic cannot be empty".into()));
        }
        if self.subscription.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "messaging.subscription cannot be empty".into(),
            ));
        }
        if !(MIN_ACK_DEADLINE_SECS..=MAX_ACK_DEADLINE_SECS).contains(&self.ack_deadline_secs) {
            return Err(ConfigError::Invalid(format!(
                "messaging.ack_deadline_secs must be within {MIN_ACK_DEADLINE_SECS}..={MAX_ACK_DEADLINE_SECS}, got {}",
                self.ack_deadline_secs
            )));
        }
        if !(MIN_RETENTION_SECS..=MAX_RETENTION_SECS).contains(&self.retention_secs) {
            return Err(ConfigError::Invalid(format!(
                "messaging.retention_secs must be within {MIN_RETENTION_SECS}..={MAX_RETENTION_SECS}, got {}",
                self.retention_secs
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventConfig {
    /// Appended to `evSubType` on every stored event, e.g. an app version.
    pub sub_type_suffix: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{CallgridConfig, ConfigError, DEFAULT_ACK_DEADLINE_SECS};
    use crate::guard::UniquenessMode;
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CallgridConfig::from_json_str("{}").unwrap();
        assert_eq!(config.uniqueness, UniquenessMode::CheckThenInsert);
        assert_eq!(config.messaging.ack_deadline_secs, DEFAULT_ACK_DEADLINE_SECS);
        assert_eq!(config.messaging.retention(), Duration::from_secs(3600));
        assert_eq!(config.events.sub_type_suffix, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = CallgridConfig::from_json_str(
            r#"{
                "log_level": "warn",
                "uniqueness": "conditional_write",
                "messaging": {"retention_secs": 172800},
                "events": {"sub_type_suffix": "-v2"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.uniqueness, UniquenessMode::ConditionalWrite);
        assert_eq!(config.messaging.retention(), Duration::from_secs(48 * 3600));
        assert_eq!(config.messaging.ack_deadline(), Duration::from_secs(600));
        assert_eq!(config.events.sub_type_suffix.as_deref(), Some("-v2"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = CallgridConfig::from_json_str(r#"{"messaging": {"ack_deadline_secs": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("ack_deadline_secs")));

        let err = CallgridConfig::from_json_str(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = CallgridConfig::from_json_str(r#"{"retention": 5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
