use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::core::LocationFix;
use crate::source::LocationSource;

/// Maximum updates to keep in the recent buffer
const MAX_RECENT_UPDATES: usize = 1000;

/// Default polling period, the once-per-second cadence of typical device
/// location feeds
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One delivered location update
#[derive(Debug, Clone)]
pub struct LocationUpdate {
    pub fix: LocationFix,
    pub delivered_at: DateTime<Utc>,
}

/// Delivery statistics
#[derive(Debug, Default)]
pub struct SimulationStats {
    pub updates_delivered: AtomicU64,
    pub poll_errors: AtomicU64,
}

/// Drives a location source on a fixed interval and streams its updates
///
/// The manager starts the source, then polls `current_location` on every
/// tick and fans the result out to a channel plus a bounded buffer of
/// recent updates. A failed poll is counted and logged and the next tick
/// retries; delivery ends when `stop` is called or the receiver is
/// dropped.
pub struct SimulationManager {
    /// Recent updates buffer
    updates: Arc<Mutex<VecDeque<LocationUpdate>>>,
    /// Delivery statistics
    stats: Arc<SimulationStats>,
    /// Stop signal for the polling task
    stop_signal: Arc<AtomicBool>,
}

impl Default for SimulationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationManager {
    pub fn new() -> Self {
        Self {
            updates: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_RECENT_UPDATES))),
            stats: Arc::new(SimulationStats::default()),
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the source and poll it on `interval`, returning the update
    /// stream
    pub fn run<S>(&mut self, mut source: S, interval: Duration) -> mpsc::Receiver<LocationUpdate>
    where
        S: LocationSource + 'static,
    {
        self.stop_signal.store(false, Ordering::SeqCst);
        self.stats.updates_delivered.store(0, Ordering::SeqCst);
        self.stats.poll_errors.store(0, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel::<LocationUpdate>(64);

        let updates = self.updates.clone();
        let stats = self.stats.clone();
        let stop_signal = self.stop_signal.clone();

        tokio::spawn(async move {
            if let Err(e) = source.start().await {
                warn!("failed to start location source {}: {}", source.name(), e);
                return;
            }
            debug!(
                "location source {} started, polling every {:?}",
                source.name(),
                interval
            );

            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if stop_signal.load(Ordering::SeqCst) {
                    break;
                }

                match source.current_location().await {
                    Ok(fix) => {
                        let update = LocationUpdate {
                            fix,
                            delivered_at: Utc::now(),
                        };

                        let mut buffer = updates.lock().await;
                        if buffer.len() >= MAX_RECENT_UPDATES {
                            buffer.pop_front();
                        }
                        buffer.push_back(update.clone());
                        drop(buffer);

                        stats.updates_delivered.fetch_add(1, Ordering::SeqCst);

                        if tx.send(update).await.is_err() {
                            // receiver dropped, nobody is listening
                            break;
                        }
                    }
                    Err(e) => {
                        stats.poll_errors.fetch_add(1, Ordering::SeqCst);
                        warn!("location poll failed: {}", e);
                    }
                }
            }

            debug!("location delivery for {} stopped", source.name());
        });

        rx
    }

    /// Start the source and poll it at the default once-per-second cadence
    pub fn run_with_default_interval<S>(&mut self, source: S) -> mpsc::Receiver<LocationUpdate>
    where
        S: LocationSource + 'static,
    {
        self.run(source, DEFAULT_POLL_INTERVAL)
    }

    /// Signal the polling task to stop after its current tick
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Drain and return the buffered recent updates
    pub async fn take_recent(&self) -> Vec<LocationUpdate> {
        std::mem::take(&mut *self.updates.lock().await)
            .into_iter()
            .collect()
    }

    /// Number of buffered recent updates
    pub async fn update_count(&self) -> usize {
        self.updates.lock().await.len()
    }

    /// Delivery statistics
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_timestamp, LocationFix};
    use crate::playback::ReplayEngine;
    use crate::source::SimulatedLocationSource;
    use chrono::Duration as ChronoDuration;

    fn test_source() -> SimulatedLocationSource {
        let t0 = parse_timestamp("2015-01-23T10:15:30.000").unwrap();
        let template = LocationFix {
            latitude: 37.3318,
            longitude: -122.0312,
            altitude: 12.5,
            horizontal_accuracy: 5.0,
            vertical_accuracy: 10.0,
            course: 270.0,
            speed: 1.4,
            timestamp: t0,
        };
        let fixes = vec![
            template.clone(),
            LocationFix {
                latitude: 37.3320,
                timestamp: t0 + ChronoDuration::seconds(10),
                ..template
            },
        ];
        SimulatedLocationSource::new("sim0", ReplayEngine::new(fixes, 1.0).unwrap())
    }

    #[tokio::test]
    async fn test_delivers_updates_on_tick() {
        let _ = tracing_subscriber::fmt().try_init();

        let mut manager = SimulationManager::new();
        let mut rx = manager.run(test_source(), Duration::from_millis(10));

        for _ in 0..3 {
            let update = rx.recv().await.expect("update stream ended early");
            assert_eq!(update.fix.latitude, 37.3318);
        }
        assert!(manager.stats().updates_delivered.load(Ordering::SeqCst) >= 3);

        manager.stop();
    }

    #[tokio::test]
    async fn test_stop_ends_delivery() {
        let mut manager = SimulationManager::new();
        let mut rx = manager.run(test_source(), Duration::from_millis(10));

        let first = rx.recv().await;
        assert!(first.is_some());

        manager.stop();
        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok(), "polling task kept delivering after stop");
    }

    #[tokio::test]
    async fn test_recent_buffer_drains() {
        let mut manager = SimulationManager::new();
        let mut rx = manager.run(test_source(), Duration::from_millis(10));

        let _ = rx.recv().await.expect("update stream ended early");
        assert!(manager.update_count().await >= 1);

        let recent = manager.take_recent().await;
        assert!(!recent.is_empty());
        assert_eq!(manager.update_count().await, 0);

        manager.stop();
    }
}
