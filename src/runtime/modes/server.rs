//! Server mode
//!
//! Starts the HTTP server and owns the shutdown sequence: stop accepting
//! requests, drain in-flight ones, then stop and join the usage pipeline.

use std::future::Future;

use actix_web::{App, HttpServer, middleware::DefaultHeaders};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::analytics::LedgerEntry;
use crate::api::middleware::TimingMiddleware;
use crate::config::StaticConfig;
use crate::runtime::lifetime;
use crate::runtime::lifetime::shutdown::ShutdownSignal;

/// Run the HTTP server until SIGINT or SIGTERM
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    // 先注册信号处理，启动期间收到的信号也不会丢
    let signal = ShutdownSignal::register();
    run_server_until(config, signal.recv()).await?;
    Ok(())
}

/// Run the HTTP server until `shutdown` resolves
///
/// Then stops accepting connections, lets in-flight requests finish, stops
/// and joins the usage aggregator, and returns its final report.
pub async fn run_server_until<F>(config: &StaticConfig, shutdown: F) -> Result<Vec<LedgerEntry>>
where
    F: Future<Output = ()>,
{
    let startup = lifetime::startup::prepare_server_startup(config).map_err(|e| {
        error!("Server startup failed: {:#}", e);
        e
    })?;
    let api = startup.api;

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        let api = api.clone();
        App::new()
            .wrap(TimingMiddleware)
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .configure(|cfg| api.configure(cfg))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    // 信号由调用方的 shutdown future 处理，以便控制关闭顺序
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);
    let handle = server.handle();

    let outcome = tokio::select! {
        res = server => res.context("HTTP server terminated unexpectedly"),
        _ = shutdown => {
            info!("Stopping HTTP server...");
            handle.stop(true).await;
            Ok(())
        }
    };

    // 即使 HTTP 服务异常退出，也要回收聚合任务
    let report = lifetime::shutdown::drain_usage(startup.aggregator).await;
    outcome?;
    info!("Graceful shutdown: all tasks completed");
    Ok(report)
}
