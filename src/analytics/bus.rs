//! Message bus seams
//!
//! The bus is an ordered, at-least-once transport with per-topic consumer
//! groups. Anything that satisfies these traits (an in-process log, Kafka,
//! NATS) can carry usage events.

use crate::errors::Result;

/// One message as delivered to a consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    /// Position in the topic log; commits are expressed in these units
    pub offset: u64,
    pub key: String,
    pub payload: Vec<u8>,
}

#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<()>;
}

/// Pull side of one topic for one consumer group
///
/// `fetch` must be cancel-safe: dropping the future before it resolves must
/// not lose a message.
#[async_trait::async_trait]
pub trait TopicConsumer: Send {
    fn topic(&self) -> &str;

    /// Wait for the next message
    async fn fetch(&mut self) -> Result<BusMessage>;

    /// Acknowledge `message` and everything before it
    async fn commit(&mut self, message: &BusMessage) -> Result<()>;
}

pub trait MessageBus: EventPublisher {
    /// Attach a consumer for `group` to `topic`, resuming after the group's
    /// last committed offset
    fn subscribe(&self, topic: &str, group: &str) -> Result<Box<dyn TopicConsumer>>;
}
