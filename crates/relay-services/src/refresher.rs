//! Periodic known-validator refresh.
//!
//! `initial_refresh` runs once before the API starts and its failure is
//! fatal to the caller. `run` then refreshes on a fixed period until the
//! shutdown channel fires; a failed periodic refresh keeps the previous
//! snapshot and is retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};

use crate::datastore::{ProposerDatastore, StoreError};
use crate::stats::StatsAggregator;

pub struct KnownValidatorRefresher {
    datastore: Arc<ProposerDatastore>,
    stats: StatsAggregator,
    interval: Duration,
    shutdown: broadcast::Receiver<()>,
}

impl KnownValidatorRefresher {
    pub fn new(
        datastore: Arc<ProposerDatastore>,
        stats: StatsAggregator,
        interval: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            datastore,
            stats,
            interval,
            shutdown,
        }
    }

    /// First, synchronous refresh. Returns the number of validators loaded.
    pub async fn initial_refresh(&self) -> Result<usize, StoreError> {
        let start = Instant::now();
        let count = self.datastore.refresh_known_validators().await?;
        self.stats.record_known_validators(count);

        if count == 0 {
            tracing::warn!(
                backend = self.datastore.store().backend(),
                "no known validators; every registration will be rejected"
            );
        } else {
            tracing::info!(
                count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "known validators loaded"
            );
        }
        Ok(count)
    }

    async fn refresh(&self) {
        let start = Instant::now();
        match self.datastore.refresh_known_validators().await {
            Ok(count) => {
                self.stats.record_known_validators(count);
                if count == 0 {
                    tracing::warn!("known validator refresh returned zero entries");
                } else {
                    tracing::info!(
                        count,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "known validators refreshed"
                    );
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    kept = self.datastore.known_validators().len(),
                    "known validator refresh failed; keeping previous set"
                );
            }
        }
    }

    /// Refresh every `interval` until shutdown. An in-flight refresh is
    /// abandoned when shutdown arrives.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(interval_secs = self.interval.as_secs(), "known validator refresher started");

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => break,
                _ = ticker.tick() => {}
            }

            let mut shutdown = self.shutdown.resubscribe();
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = self.refresh() => {}
            }
        }

        tracing::info!("known validator refresher shutting down");
    }
}
