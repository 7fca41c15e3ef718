use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

use crate::analytics::{LedgerEntry, UsageLedger};
use crate::storage::LinkStore;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: u64,
    pub backend: &'static str,
    pub links_count: usize,
    pub ledger_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub links: usize,
    pub entries: Vec<LedgerEntry>,
}

/// Liveness and usage snapshots
///
/// Reads the store and ledger directly; neither call can block for long.
pub struct DiagnosticsService;

impl DiagnosticsService {
    pub async fn health_check(
        store: web::Data<Arc<dyn LinkStore>>,
        ledger: web::Data<Arc<UsageLedger>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        HttpResponse::Ok().json(HealthResponse {
            status: "healthy",
            timestamp: now.to_rfc3339(),
            uptime,
            backend: store.backend_name(),
            links_count: store.len(),
            ledger_entries: ledger.len(),
        })
    }

    pub async fn usage_stats(
        store: web::Data<Arc<dyn LinkStore>>,
        ledger: web::Data<Arc<UsageLedger>>,
    ) -> impl Responder {
        HttpResponse::Ok().json(StatsResponse {
            links: store.len(),
            entries: ledger.report(),
        })
    }
}

pub fn diagnostics_routes() -> actix_web::Scope {
    web::scope("/_")
        .route("/health", web::get().to(DiagnosticsService::health_check))
        .route("/health", web::head().to(DiagnosticsService::health_check))
        .route("/stats", web::get().to(DiagnosticsService::usage_stats))
}
