use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::analytics::UsageReporter;
use crate::config::LinksConfig;
use crate::errors::{Result, SecretLinksError};
use crate::storage::{Link, LinkStore};
use crate::utils::KeyGenerator;

pub const EXPECTED_INT: &str = "Expected int value";
pub const EXPECTED_SECRET: &str = "Expected 'secret' value";

// ============ Request/Response DTOs ============

/// Request to create a new link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLinkRequest {
    /// Already-encrypted secret
    pub secret: String,
    /// Lifetime in minutes (None = configured default)
    pub ttl_minutes: Option<i64>,
    /// View budget (None = configured default)
    pub max_views: Option<i64>,
}

impl CreateLinkRequest {
    /// Build a request from raw form values
    ///
    /// Empty numeric fields count as omitted. Anything else that is not an
    /// integer is rejected before the store is touched.
    pub fn from_form(
        secret: String,
        expiration: Option<&str>,
        max_views: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            secret,
            ttl_minutes: parse_optional_int(expiration)?,
            max_views: parse_optional_int(max_views)?,
        })
    }
}

/// Result of link creation
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub key: String,
    pub link: Link,
}

pub fn parse_optional_int(raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| SecretLinksError::validation(EXPECTED_INT)),
    }
}

// ============ CreationService Implementation ============

pub struct CreationService {
    store: Arc<dyn LinkStore>,
    keygen: Arc<dyn KeyGenerator>,
    settings: LinksConfig,
    reporter: Option<Arc<UsageReporter>>,
}

impl CreationService {
    pub fn new(
        store: Arc<dyn LinkStore>,
        keygen: Arc<dyn KeyGenerator>,
        settings: LinksConfig,
        reporter: Option<Arc<UsageReporter>>,
    ) -> Self {
        Self {
            store,
            keygen,
            settings,
            reporter,
        }
    }

    /// Store `req.secret` under a freshly generated key
    ///
    /// Key collisions are retried with a new candidate, up to
    /// `max_key_attempts` times.
    pub async fn create(&self, req: CreateLinkRequest) -> Result<CreatedLink> {
        let (ttl, max_views) = self.validate(&req)?;

        for attempt in 1..=self.settings.max_key_attempts {
            let key = self.keygen.generate(self.settings.key_length);
            let now = Utc::now();
            let link = Link::new(req.secret.clone(), expires_at(now, ttl)?, max_views);

            if self.store.create_if_absent(&key, link.clone()) {
                info!(
                    "CreationService: created link '{}' (max_views={}, expires_at={})",
                    key,
                    link.max_views,
                    link.expires_at.to_rfc3339()
                );
                if let Some(reporter) = &self.reporter {
                    reporter.link_created(&key, now).await;
                }
                return Ok(CreatedLink { key, link });
            }

            debug!(
                "CreationService: key '{}' already taken (attempt {})",
                key, attempt
            );
        }

        warn!(
            "CreationService: no free key after {} attempts",
            self.settings.max_key_attempts
        );
        Err(SecretLinksError::keyspace_exhausted(format!(
            "No free key of length {} after {} attempts",
            self.settings.key_length, self.settings.max_key_attempts
        )))
    }

    fn validate(&self, req: &CreateLinkRequest) -> Result<(Duration, u32)> {
        if req.secret.is_empty() {
            return Err(SecretLinksError::validation(EXPECTED_SECRET));
        }

        let ttl_minutes = req.ttl_minutes.unwrap_or(self.settings.default_ttl_minutes);
        if ttl_minutes <= 0 {
            return Err(SecretLinksError::validation(
                "Expiration must be a positive number of minutes",
            ));
        }
        let ttl = Duration::try_minutes(ttl_minutes)
            .ok_or_else(|| SecretLinksError::validation("Expiration is out of range"))?;
        // 提前检查，保证越界输入不会进入存储
        expires_at(Utc::now(), ttl)?;

        let max_views = match req.max_views {
            Some(v) if v <= 0 => {
                return Err(SecretLinksError::validation("Max views must be positive"));
            }
            Some(v) => u32::try_from(v)
                .map_err(|_| SecretLinksError::validation("Max views is out of range"))?,
            None => self.settings.default_max_views,
        };

        Ok((ttl, max_views))
    }
}

fn expires_at(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| SecretLinksError::validation("Expiration is out of range"))
}
