use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::store::ComparisonStore;

/// Background task that periodically sweeps expired records.
///
/// Sweeps run on the blocking pool because eviction deletes files.
pub struct Reaper {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Reaper {
    /// Spawn the reaper on the current tokio runtime.
    pub fn spawn(store: Arc<ComparisonStore>, period: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; nothing can be expired yet.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let store = Arc::clone(&store);
                        match tokio::task::spawn_blocking(move || store.sweep()).await {
                            Ok(0) => {}
                            Ok(evicted) => info!(evicted, "swept expired comparisons"),
                            Err(err) => warn!(error = %err, "sweep task failed"),
                        }
                    }
                    _ = stopped.changed() => break,
                }
            }
        });
        info!(?period, "reaper started");
        Self { stop, handle }
    }

    /// Signal the reaper to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(err) = self.handle.await {
            warn!(error = %err, "reaper task ended abnormally");
        }
    }
}
