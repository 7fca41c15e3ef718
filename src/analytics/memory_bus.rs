//! In-process message bus
//!
//! Each topic is an append-only log plus the committed offset of every
//! consumer group that ever subscribed to it. A consumer starts at its
//! group's committed offset (or the oldest retained message), so a loop that
//! is restarted picks up everything it fetched but never acknowledged.
//! Messages every known group has committed are dropped from the log.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::trace;

use super::bus::{BusMessage, EventPublisher, MessageBus, TopicConsumer};
use crate::errors::{Result, SecretLinksError};

#[derive(Default)]
struct TopicLog {
    /// Offset of `messages[0]`
    base: u64,
    messages: VecDeque<BusMessage>,
    committed: HashMap<String, u64>,
}

impl TopicLog {
    fn next_offset(&self) -> u64 {
        self.base + self.messages.len() as u64
    }

    fn read(&self, position: u64) -> Option<BusMessage> {
        let position = position.max(self.base);
        self.messages.get((position - self.base) as usize).cloned()
    }

    fn compact(&mut self) {
        let Some(floor) = self.committed.values().min().copied() else {
            return;
        };
        while self
            .messages
            .front()
            .is_some_and(|front| front.offset < floor)
        {
            self.messages.pop_front();
            self.base += 1;
        }
    }
}

#[derive(Default)]
struct TopicState {
    log: Mutex<TopicLog>,
    notify: Notify,
}

#[derive(Default)]
pub struct MemoryBus {
    topics: Mutex<HashMap<String, Arc<TopicState>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn topic(&self, name: &str) -> Arc<TopicState> {
        Arc::clone(self.topics.lock().entry(name.to_string()).or_default())
    }

    /// Messages still retained for `topic`
    pub fn retained(&self, topic: &str) -> usize {
        self.topic(topic).log.lock().messages.len()
    }

    /// Committed offset of `group` on `topic`, if it ever committed
    pub fn committed_offset(&self, topic: &str, group: &str) -> Option<u64> {
        self.topic(topic).log.lock().committed.get(group).copied()
    }
}

#[async_trait::async_trait]
impl EventPublisher for MemoryBus {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<()> {
        let state = self.topic(topic);
        {
            let mut log = state.log.lock();
            let offset = log.next_offset();
            log.messages.push_back(BusMessage {
                topic: topic.to_string(),
                offset,
                key: key.to_string(),
                payload,
            });
            trace!("MemoryBus: published '{}' at {}:{}", key, topic, offset);
        }
        state.notify.notify_waiters();
        Ok(())
    }
}

impl MessageBus for MemoryBus {
    fn subscribe(&self, topic: &str, group: &str) -> Result<Box<dyn TopicConsumer>> {
        if group.is_empty() {
            return Err(SecretLinksError::transport("consumer group must not be empty"));
        }

        let state = self.topic(topic);
        let position = {
            let mut log = state.log.lock();
            let base = log.base;
            *log.committed.entry(group.to_string()).or_insert(base)
        };

        Ok(Box::new(MemoryConsumer {
            topic: topic.to_string(),
            group: group.to_string(),
            state,
            position,
        }))
    }
}

struct MemoryConsumer {
    topic: String,
    group: String,
    state: Arc<TopicState>,
    position: u64,
}

#[async_trait::async_trait]
impl TopicConsumer for MemoryConsumer {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn fetch(&mut self) -> Result<BusMessage> {
        loop {
            // 先注册通知，再检查日志，避免丢失唤醒
            let notified = self.state.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let next = self.state.log.lock().read(self.position);
            if let Some(message) = next {
                self.position = message.offset + 1;
                return Ok(message);
            }

            notified.await;
        }
    }

    async fn commit(&mut self, message: &BusMessage) -> Result<()> {
        if message.topic != self.topic {
            return Err(SecretLinksError::transport(format!(
                "cannot commit message from '{}' on consumer of '{}'",
                message.topic, self.topic
            )));
        }

        let mut log = self.state.log.lock();
        let committed = log.committed.entry(self.group.clone()).or_insert(0);
        *committed = (*committed).max(message.offset + 1);
        log.compact();
        Ok(())
    }
}
