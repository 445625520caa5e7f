/*!
 * Host Memory Sampler
 * Background task that refreshes host memory figures on a fixed interval
 *
 * Strategy: sample on the blocking pool, publish successes into a watch
 * channel, drop failures. Readers always see the last good sample, and
 * merge it into engine state only at their own synchronization points.
 */

use super::host::{HostMemorySample, HostMemorySource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle to the background sampling task
pub struct HostSampler {
    latest: watch::Receiver<Option<HostMemorySample>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HostSampler {
    /// Spawn the sampling loop on the current tokio runtime
    ///
    /// The first sample is taken immediately.
    pub fn spawn<S>(source: S, period: Duration) -> Self
    where
        S: HostMemorySource + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_sampler_loop(Arc::new(source), period, tx, shutdown_rx));

        info!(period_ms = period.as_millis() as u64, "Host memory sampler started");
        Self {
            latest: rx,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Most recent successful sample, if any
    pub fn latest(&self) -> Option<HostMemorySample> {
        *self.latest.borrow()
    }

    /// Independent receiver for callers that want change notifications
    pub fn subscribe(&self) -> watch::Receiver<Option<HostMemorySample>> {
        self.latest.clone()
    }

    /// Stop the task and wait for it to exit
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Host memory sampler did not exit cleanly");
            }
        }
        info!("Host memory sampler stopped");
    }
}

impl Drop for HostSampler {
    fn drop(&mut self) {
        // Graceful shutdown already ran
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_sampler_loop<S>(
    source: Arc<S>,
    period: Duration,
    tx: watch::Sender<Option<HostMemorySample>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    S: HostMemorySource + 'static,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let source = Arc::clone(&source);
                match tokio::task::spawn_blocking(move || source.sample()).await {
                    Ok(Ok(sample)) => {
                        if tx.send(Some(sample)).is_err() {
                            debug!("All sample receivers dropped, stopping sampler");
                            break;
                        }
                    }
                    Ok(Err(e)) => {
                        debug!(error = %e, "Host memory sample failed, keeping previous value");
                    }
                    Err(e) => {
                        warn!(error = %e, "Host memory sample task failed");
                    }
                }
            }

            _ = &mut shutdown_rx => break,
        }
    }
}
