use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::lifecycle::LinkLifecycle;
use crate::analytics::UsageReporter;
use crate::errors::{Result, SecretLinksError};
use crate::storage::LinkStore;

/// A successfully served view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedSecret {
    /// Still-encrypted secret
    pub secret: String,
    /// Views consumed, this one included
    pub views: u32,
    pub max_views: u32,
}

pub struct RetrievalService {
    store: Arc<dyn LinkStore>,
    reporter: Option<Arc<UsageReporter>>,
}

impl RetrievalService {
    pub fn new(store: Arc<dyn LinkStore>, reporter: Option<Arc<UsageReporter>>) -> Self {
        Self { store, reporter }
    }

    /// Consume one view of `key`
    ///
    /// The view is only counted if the stored link is unchanged since it was
    /// read; a lost race re-reads and re-evaluates, so concurrent callers can
    /// never serve more than `max_views` times.
    pub async fn retrieve(&self, key: &str) -> Result<ServedSecret> {
        loop {
            let link = self
                .store
                .get(key)
                .ok_or_else(|| SecretLinksError::not_found(format!("Link '{}' not found", key)))?;

            let now = Utc::now();
            let state = LinkLifecycle::evaluate(&link, now);
            if state.is_expired() {
                self.store.delete(key);
                info!("RetrievalService: link '{}' {}, deleted", key, state.as_str());
                return Err(SecretLinksError::gone(format!(
                    "Link '{}' {}",
                    key,
                    state.as_str()
                )));
            }

            let viewed = link.viewed();
            if self.store.compare_and_swap(key, &link, viewed.clone()) {
                debug!(
                    "RetrievalService: served '{}' ({} views left)",
                    key,
                    viewed.remaining_views()
                );
                if let Some(reporter) = &self.reporter {
                    reporter.link_visited(key, now).await;
                }
                return Ok(ServedSecret {
                    secret: viewed.secret,
                    views: viewed.views,
                    max_views: viewed.max_views,
                });
            }

            debug!("RetrievalService: concurrent update on '{}', retrying", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Link, MemoryLinkStore};
    use chrono::Duration;

    fn store_with(key: &str, link: Link) -> Arc<MemoryLinkStore> {
        let store = Arc::new(MemoryLinkStore::new());
        assert!(store.create_if_absent(key, link));
        store
    }

    #[tokio::test]
    async fn test_exactly_max_views_successes() {
        let store = store_with(
            "k",
            Link::new("c".into(), Utc::now() + Duration::minutes(10), 3),
        );
        let svc = RetrievalService::new(store.clone(), None);

        for n in 1..=3 {
            let served = svc.retrieve("k").await.unwrap();
            assert_eq!(served.secret, "c");
            assert_eq!(served.views, n);
        }
        assert!(matches!(
            svc.retrieve("k").await,
            Err(SecretLinksError::Gone(_))
        ));
        assert!(store.get("k").is_none());
        assert!(matches!(
            svc.retrieve("k").await,
            Err(SecretLinksError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_time_expiry_ignores_remaining_views() {
        let store = store_with(
            "old",
            Link::new("c".into(), Utc::now() - Duration::seconds(1), 10),
        );
        let svc = RetrievalService::new(store.clone(), None);

        let err = svc.retrieve("old").await.unwrap_err();
        assert!(err.message().contains("expired by time"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let svc = RetrievalService::new(Arc::new(MemoryLinkStore::new()), None);
        assert_eq!(svc.retrieve("nope").await.unwrap_err().code(), "E002");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_retrievals_never_exceed_budget() {
        const MAX_VIEWS: u32 = 5;
        const REQUESTS: usize = 64;

        for _ in 0..20 {
            let store = store_with(
                "hot",
                Link::new("c".into(), Utc::now() + Duration::minutes(10), MAX_VIEWS),
            );
            let svc = Arc::new(RetrievalService::new(store, None));

            let handles: Vec<_> = (0..REQUESTS)
                .map(|_| {
                    let svc = Arc::clone(&svc);
                    tokio::spawn(async move { svc.retrieve("hot").await })
                })
                .collect();

            let mut served = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(_) => served += 1,
                    Err(SecretLinksError::Gone(_)) | Err(SecretLinksError::NotFound(_)) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
            assert_eq!(served, MAX_VIEWS as usize);
        }
    }
}
