//! 使用事件聚合器
//!
//! 每个 topic 一个独立的消费循环：
//! - 拉取消息（可挂起）
//! - 解码并写入 UsageLedger
//! - 向总线确认
//!
//! Shutdown flips a watch channel; every loop notices it at its next await
//! point, and [`EventAggregator::shutdown`] joins all of them before
//! producing the final report.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{
    BusMessage, LedgerEntry, MessageBus, TopicConsumer, Topics, UsageEvent, UsageLedger,
};
use crate::errors::Result;

/// What an event on a given topic means for the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    Creation,
    Visit,
}

impl UsageKind {
    fn apply(self, ledger: &UsageLedger, key: &str, at: DateTime<Utc>) -> LedgerEntry {
        match self {
            UsageKind::Creation => ledger.record_creation(key, at),
            UsageKind::Visit => ledger.record_visit(key, at),
        }
    }
}

pub struct EventAggregator {
    ledger: Arc<UsageLedger>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl EventAggregator {
    /// Spawn one consumption loop per `(consumer, kind)` binding
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        ledger: Arc<UsageLedger>,
        bindings: Vec<(Box<dyn TopicConsumer>, UsageKind)>,
        poll_timeout: Duration,
    ) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);

        let tasks = bindings
            .into_iter()
            .map(|(consumer, kind)| {
                let topic = consumer.topic().to_string();
                info!("EventAggregator: consuming '{}' as {:?}", topic, kind);
                let handle = tokio::spawn(run_consumer_loop(
                    consumer,
                    kind,
                    Arc::clone(&ledger),
                    shutdown_rx.clone(),
                    poll_timeout,
                ));
                (topic, handle)
            })
            .collect();

        Self {
            ledger,
            shutdown,
            tasks,
        }
    }

    /// Subscribe to both usage topics on `bus` and start consuming
    pub fn subscribe(
        bus: &dyn MessageBus,
        topics: &Topics,
        group_id: &str,
        ledger: Arc<UsageLedger>,
        poll_timeout: Duration,
    ) -> Result<Self> {
        let bindings = vec![
            (bus.subscribe(&topics.new_links, group_id)?, UsageKind::Creation),
            (bus.subscribe(&topics.link_visits, group_id)?, UsageKind::Visit),
        ];
        Ok(Self::start(ledger, bindings, poll_timeout))
    }

    pub fn ledger(&self) -> &Arc<UsageLedger> {
        &self.ledger
    }

    /// Number of loops still running
    pub fn active_loops(&self) -> usize {
        self.tasks.iter().filter(|(_, h)| !h.is_finished()).count()
    }

    /// Stop every loop, wait for all of them, then snapshot the ledger
    pub async fn shutdown(self) -> Vec<LedgerEntry> {
        // 接收端全部退出时 send 会失败，此时无需通知
        let _ = self.shutdown.send(true);

        for (topic, handle) in self.tasks {
            match handle.await {
                Ok(()) => debug!("EventAggregator: loop for '{}' stopped", topic),
                Err(e) => error!("EventAggregator: loop for '{}' failed: {}", topic, e),
            }
        }

        self.ledger.report()
    }
}

async fn run_consumer_loop(
    mut consumer: Box<dyn TopicConsumer>,
    kind: UsageKind,
    ledger: Arc<UsageLedger>,
    mut shutdown: watch::Receiver<bool>,
    poll_timeout: Duration,
) {
    let topic = consumer.topic().to_string();

    loop {
        if *shutdown.borrow() {
            break;
        }

        let fetched = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            res = tokio::time::timeout(poll_timeout, consumer.fetch()) => res,
        };

        let message = match fetched {
            // poll timeout, go round and re-check shutdown
            Err(_) => continue,
            Ok(Err(e)) => {
                warn!("Consumer error (topic {}): {}", topic, e);
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(poll_timeout) => continue,
                }
            }
            Ok(Ok(message)) => message,
        };

        let entry = apply_message(&message, kind, &ledger);

        if let Err(e) = consumer.commit(&message).await {
            warn!("Commit error (topic {}): {}", topic, e);
        } else if let Some(entry) = entry {
            debug!("{}", entry.summary());
        }
    }

    info!("EventAggregator: loop for '{}' exiting", topic);
}

/// Decode and fold one message into the ledger
///
/// Malformed payloads yield `None`; the caller still acknowledges them.
fn apply_message(
    message: &BusMessage,
    kind: UsageKind,
    ledger: &UsageLedger,
) -> Option<LedgerEntry> {
    match serde_json::from_slice::<UsageEvent>(&message.payload) {
        Ok(event) => Some(kind.apply(ledger, &event.link_key, event.timestamp)),
        Err(e) => {
            warn!(
                "JSON decode error (topic {}, offset {}): {}",
                message.topic, message.offset, e
            );
            None
        }
    }
}
