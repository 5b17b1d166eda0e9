//! Periodic quote refresh.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::MarketDataCache;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running refresh task.
#[derive(Debug)]
pub struct RefreshLoop {
    handle: JoinHandle<()>,
    period: Duration,
}

impl RefreshLoop {
    /// The configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel the task. An in-flight refresh is dropped at its next await.
    pub fn stop(self) {
        self.handle.abort();
        info!("Refresh loop stopped");
    }
}

impl MarketDataCache {
    /// Refresh immediately, then every `period` until the returned handle is
    /// stopped.
    ///
    /// Ticks missed while a slow refresh is running are delayed rather than
    /// bunched up.
    pub fn spawn_refresh_loop(self: &Arc<Self>, period: Duration) -> RefreshLoop {
        let period = period.max(MIN_INTERVAL);
        let cache = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let status = cache.refresh().await;
                debug!(%status, "Scheduled refresh complete");
            }
        });

        info!(period_ms = period.as_millis() as u64, "Refresh loop started");
        RefreshLoop { handle, period }
    }
}
