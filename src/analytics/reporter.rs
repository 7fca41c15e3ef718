use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{trace, warn};

use super::{EventPublisher, Topics, UsageEvent};

/// Publishes usage events on behalf of the serving path
///
/// Failures are logged and swallowed: analytics must never change what a
/// caller of create/retrieve sees.
pub struct UsageReporter {
    publisher: Arc<dyn EventPublisher>,
    topics: Topics,
}

impl UsageReporter {
    pub fn new(publisher: Arc<dyn EventPublisher>, topics: Topics) -> Self {
        Self { publisher, topics }
    }

    pub async fn link_created(&self, key: &str, at: DateTime<Utc>) {
        self.publish(&self.topics.new_links, UsageEvent::new(key, at))
            .await;
    }

    pub async fn link_visited(&self, key: &str, at: DateTime<Utc>) {
        self.publish(&self.topics.link_visits, UsageEvent::new(key, at))
            .await;
    }

    async fn publish(&self, topic: &str, event: UsageEvent) {
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => {
                warn!("UsageReporter: failed to encode event for '{}': {}", event.link_key, e);
                return;
            }
        };

        match self.publisher.publish(topic, &event.link_key, payload).await {
            Ok(()) => trace!("UsageReporter: '{}' -> {}", event.link_key, topic),
            Err(e) => warn!(
                "UsageReporter: publish to '{}' failed for '{}': {}",
                topic, event.link_key, e
            ),
        }
    }
}
