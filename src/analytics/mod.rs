//! Usage analytics
//!
//! The serving path publishes one event per created link and one per
//! successful view. Independently, one consumption loop per topic folds those
//! events into a [`UsageLedger`]. The ledger is observational only and never
//! feeds back into the link store.

pub mod aggregator;
pub mod bus;
pub mod ledger;
pub mod memory_bus;
pub mod reporter;

pub use aggregator::{EventAggregator, UsageKind};
pub use bus::{BusMessage, EventPublisher, MessageBus, TopicConsumer};
pub use ledger::{LedgerEntry, UsageLedger};
pub use memory_bus::MemoryBus;
pub use reporter::UsageReporter;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EventsConfig;

/// Payload carried on both usage topics
///
/// Which topic a message arrived on decides what it means; the payload
/// itself is the same shape for creations and visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    #[serde(alias = "linkkey", alias = "linkKey")]
    pub link_key: String,
    #[serde(alias = "nowtime")]
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    pub fn new(link_key: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            link_key: link_key.into(),
            timestamp,
        }
    }
}

/// Topic names for the two usage streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub new_links: String,
    pub link_visits: String,
}

impl Topics {
    pub fn from_config(config: &EventsConfig) -> Self {
        Self {
            new_links: config.new_links_topic.clone(),
            link_visits: config.link_visits_topic.clone(),
        }
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self::from_config(&EventsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accepts_legacy_field_names() {
        let raw = r#"{"linkkey":"abc","nowtime":"2024-01-02T03:04:05Z"}"#;
        let event: UsageEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.link_key, "abc");
        assert_eq!(event.timestamp.to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_event_serializes_snake_case() {
        let event = UsageEvent::new("k", Utc::now());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["link_key"], "k");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_default_topics() {
        let topics = Topics::default();
        assert_eq!(topics.new_links, "new-links");
        assert_eq!(topics.link_visits, "link-visits");
    }
}
