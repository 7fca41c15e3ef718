use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::analytics::{
    EventAggregator, EventPublisher, MemoryBus, Topics, UsageLedger, UsageReporter,
};
use crate::api::ApiState;
use crate::api::services::{AppStartTime, LinkUrlBase};
use crate::config::StaticConfig;
use crate::crypto::{AesGcmCipher, SecretCipher};
use crate::services::{CreationService, RetrievalService};
use crate::storage::{LinkStore, MemoryLinkStore};
use crate::utils::RandomKeyGenerator;

pub struct StartupContext {
    pub api: ApiState,
    /// `None` when usage events are disabled
    pub aggregator: Option<EventAggregator>,
}

/// 准备服务器启动的上下文
///
/// Builds the store, cipher, usage pipeline and services. Must run inside a
/// Tokio runtime since the aggregator spawns its loops here.
pub fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    if config.links.key_length == 0 {
        bail!("links.key_length must be at least 1");
    }
    if config.links.max_key_attempts == 0 {
        bail!("links.max_key_attempts must be at least 1");
    }

    if config.crypto.uses_builtin_key() {
        warn!("crypto.key is the built-in default, set your own key (SL__CRYPTO__KEY) before storing real secrets");
    }
    let cipher: Arc<dyn SecretCipher> = Arc::new(
        AesGcmCipher::from_key_material(&config.crypto.key)
            .context("Failed to initialize cipher")?,
    );

    let store: Arc<dyn LinkStore> = Arc::new(MemoryLinkStore::new());
    info!("Using link store backend: {}", store.backend_name());

    let ledger = Arc::new(UsageLedger::new());

    let (reporter, aggregator) = if config.events.enabled {
        let bus = Arc::new(MemoryBus::new());
        let topics = Topics::from_config(&config.events);
        let aggregator = EventAggregator::subscribe(
            bus.as_ref(),
            &topics,
            &config.events.group_id,
            Arc::clone(&ledger),
            Duration::from_millis(config.events.poll_timeout_ms.max(1)),
        )
        .context("Failed to start usage aggregator")?;
        info!(
            "Usage events enabled: '{}' and '{}' (group '{}')",
            topics.new_links, topics.link_visits, config.events.group_id
        );

        let publisher: Arc<dyn EventPublisher> = bus;
        let reporter = Arc::new(UsageReporter::new(publisher, topics));
        (Some(reporter), Some(aggregator))
    } else {
        warn!("Usage events disabled, the usage ledger will stay empty");
        (None, None)
    };

    let creation = Arc::new(CreationService::new(
        Arc::clone(&store),
        Arc::new(RandomKeyGenerator),
        config.links.clone(),
        reporter.clone(),
    ));
    let retrieval = Arc::new(RetrievalService::new(Arc::clone(&store), reporter));

    let api = ApiState {
        store,
        cipher,
        ledger,
        creation,
        retrieval,
        url_base: LinkUrlBase(config.server.public_base_url.clone()),
        start_time: AppStartTime::now(),
    };

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { api, aggregator })
}
