use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::core::LocationFix;
use crate::error::ReplayError;
use crate::input::{decode_csv, decode_json};
use crate::playback::PlaybackConfig;

/// Replay engine for recorded location tracks
///
/// Holds an ordered track of fixes and, once started, answers "which fix is
/// active now" against a wall-clock anchor, with recorded time scaled by
/// the playback speed. All queries are pure arithmetic over resident data;
/// nothing blocks. The engine itself does no locking: a caller that shares
/// it across threads wraps it in its own synchronization.
#[derive(Debug)]
pub struct ReplayEngine {
    fixes: Vec<LocationFix>,
    config: PlaybackConfig,
    recording_start: DateTime<Utc>,
    simulation_start: Option<DateTime<Utc>>,
}

impl ReplayEngine {
    /// Create an engine over an already-decoded track.
    ///
    /// Fixes are expected in ascending timestamp order, as recorded; no
    /// re-sort is performed. `speed` must be strictly positive.
    pub fn new(fixes: Vec<LocationFix>, speed: f64) -> Result<Self, ReplayError> {
        debug_assert!(speed > 0.0);

        let recording_start = fixes
            .first()
            .map(|fix| fix.timestamp)
            .ok_or(ReplayError::EmptySequence)?;

        Ok(Self {
            fixes,
            config: PlaybackConfig { speed },
            recording_start,
            simulation_start: None,
        })
    }

    /// Create an engine from raw JSON track bytes
    pub fn from_json(data: &[u8], speed: f64) -> Result<Self, ReplayError> {
        Self::new(decode_json(data)?, speed)
    }

    /// Create an engine from raw CSV track bytes
    pub fn from_csv(data: &[u8], speed: f64) -> Result<Self, ReplayError> {
        Self::new(decode_csv(data)?, speed)
    }

    /// Number of fixes in the track
    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    /// Always false; construction rejects empty tracks
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Playback speed multiplier
    pub fn speed(&self) -> f64 {
        self.config.speed
    }

    /// Check if playback has been started
    pub fn is_started(&self) -> bool {
        self.simulation_start.is_some()
    }

    /// Recorded timestamp of the first fix
    pub fn recording_start(&self) -> DateTime<Utc> {
        self.recording_start
    }

    /// Recorded timestamp of the last fix
    pub fn recording_end(&self) -> DateTime<Utc> {
        // construction guarantees at least one fix
        self.fixes[self.fixes.len() - 1].timestamp
    }

    /// Recorded span of the track
    pub fn duration(&self) -> Duration {
        self.recording_end() - self.recording_start
    }

    /// Span of the track once scaled by the playback speed
    pub fn simulated_duration(&self) -> Duration {
        let recorded_ms = self.duration().num_milliseconds();
        Duration::milliseconds((recorded_ms as f64 / self.config.speed).round() as i64)
    }

    /// Begin playback, anchoring simulated time at the current wall clock.
    ///
    /// Calling `start` again re-anchors: playback restarts from the first
    /// fix and every subsequently reported timestamp is computed against
    /// the new anchor.
    pub fn start(&mut self) {
        self.start_at(Utc::now());
    }

    /// Begin playback anchored at an explicit instant
    pub fn start_at(&mut self, instant: DateTime<Utc>) {
        debug!(
            "playback anchored at {}, {} fixes at {}x",
            instant,
            self.fixes.len(),
            self.config.speed
        );
        self.simulation_start = Some(instant);
    }

    /// Offset location of the fix active right now
    pub fn current_location(&self) -> Result<LocationFix, ReplayError> {
        self.location_at(Utc::now())
    }

    /// Offset location of the fix active at `now`.
    ///
    /// The active fix is the last one whose simulated instant is not after
    /// `now`. Queries before the first fix's simulated instant report the
    /// first fix; once the track is exhausted playback holds at the final
    /// fix rather than erroring or wrapping.
    pub fn location_at(&self, now: DateTime<Utc>) -> Result<LocationFix, ReplayError> {
        let start = self.simulation_start.ok_or(ReplayError::NotStarted)?;
        let speed = self.config.speed;

        let idx = match self.fixes.binary_search_by(|fix| {
            fix.simulated_instant(self.recording_start, speed, start)
                .cmp(&now)
        }) {
            Ok(pos) => pos,
            Err(pos) => pos.saturating_sub(1),
        };

        Ok(self.fixes[idx].offset_from(self.recording_start, speed, start))
    }
}
