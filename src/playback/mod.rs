pub mod engine;

pub use engine::ReplayEngine;

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// 1.0 = real-time, 2.0 = twice as fast
    pub speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}
