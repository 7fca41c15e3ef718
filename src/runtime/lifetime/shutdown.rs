use tracing::{info, warn};

use crate::analytics::{EventAggregator, LedgerEntry};

/// Process stop signals: SIGINT (Ctrl+C) and, on Unix, SIGTERM
///
/// Handlers are installed by [`ShutdownSignal::register`], so a signal that
/// arrives before [`ShutdownSignal::recv`] is polled is not lost.
pub struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: Option<tokio::signal::unix::Signal>,
    #[cfg(unix)]
    terminate: Option<tokio::signal::unix::Signal>,
}

impl ShutdownSignal {
    /// Install the handlers. Must be called inside a Tokio runtime.
    ///
    /// A handler that cannot be installed is logged and skipped; the
    /// remaining one still triggers shutdown.
    #[cfg(unix)]
    pub fn register() -> Self {
        use tokio::signal::unix::{SignalKind, signal};

        let interrupt = signal(SignalKind::interrupt())
            .map_err(|e| warn!("Failed to create SIGINT handler: {}", e))
            .ok();
        let terminate = signal(SignalKind::terminate())
            .map_err(|e| warn!("Failed to create SIGTERM handler: {}", e))
            .ok();
        Self {
            interrupt,
            terminate,
        }
    }

    #[cfg(not(unix))]
    pub fn register() -> Self {
        Self {}
    }

    /// Resolve once a stop signal is received
    #[cfg(unix)]
    pub async fn recv(mut self) {
        async fn next(stream: Option<&mut tokio::signal::unix::Signal>) {
            match stream {
                Some(stream) => {
                    stream.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        }

        tokio::select! {
            _ = next(self.interrupt.as_mut()) => {
                info!("Received SIGINT, stopping...");
            }
            _ = next(self.terminate.as_mut()) => {
                info!("Received SIGTERM, stopping...");
            }
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, stopping..."),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await
            }
        }
    }
}

/// Stop every consumption loop, wait for all of them, then log the report
///
/// Every loop is joined; each one notices cancellation within one poll
/// interval.
pub async fn drain_usage(aggregator: Option<EventAggregator>) -> Vec<LedgerEntry> {
    let Some(aggregator) = aggregator else {
        info!("Usage aggregator not running, nothing to drain");
        return Vec::new();
    };

    info!(
        "Stopping usage aggregator ({} active loops)...",
        aggregator.active_loops()
    );
    let report = aggregator.shutdown().await;

    info!("Final usage report: {} links", report.len());
    for entry in &report {
        info!("{}", entry.summary());
    }
    report
}
