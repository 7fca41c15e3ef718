//! HTTP surface
//!
//! Handlers stay thin: they decode requests, call the service layer, and
//! map [`SecretLinksError`](crate::errors::SecretLinksError) onto status codes.

pub mod middleware;
pub mod services;

use actix_web::web;
use std::sync::Arc;

use crate::analytics::UsageLedger;
use crate::crypto::SecretCipher;
use crate::services::{CreationService, RetrievalService};
use crate::storage::LinkStore;
use services::{AppStartTime, LinkUrlBase, diagnostics_routes, secret_routes};

/// Everything the handlers need, shared across workers
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn LinkStore>,
    pub cipher: Arc<dyn SecretCipher>,
    pub ledger: Arc<UsageLedger>,
    pub creation: Arc<CreationService>,
    pub retrieval: Arc<RetrievalService>,
    pub url_base: LinkUrlBase,
    pub start_time: AppStartTime,
}

impl ApiState {
    /// Register shared data and every route on an app
    ///
    /// Diagnostics are registered first so `/_/...` never reaches the key
    /// route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.store.clone()))
            .app_data(web::Data::new(self.cipher.clone()))
            .app_data(web::Data::new(self.ledger.clone()))
            .app_data(web::Data::new(self.creation.clone()))
            .app_data(web::Data::new(self.retrieval.clone()))
            .app_data(web::Data::new(self.url_base.clone()))
            .app_data(web::Data::new(self.start_time.clone()))
            .app_data(web::FormConfig::default().limit(64 * 1024))
            .service(diagnostics_routes())
            .service(secret_routes());
    }
}
