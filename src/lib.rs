//! GPS track replay and location simulation toolkit.
//!
//! Decodes recorded tracks of location fixes (JSON or CSV) and replays them
//! at a configurable speed, standing in for a live positioning feed during
//! location-based testing. Consumers either query a [`ReplayEngine`]
//! directly on their own schedule or run a [`SimulationManager`] that polls
//! a [`LocationSource`] on a fixed interval and streams updates over a
//! channel.
//!
//! ```no_run
//! use tracksim::{ReplayEngine, SimulatedLocationSource, SimulationManager};
//!
//! # async fn demo(track: &[u8]) -> anyhow::Result<()> {
//! let engine = ReplayEngine::from_json(track, 2.0)?;
//! let source = SimulatedLocationSource::new("sim0", engine);
//!
//! let mut manager = SimulationManager::new();
//! let mut updates = manager.run_with_default_interval(source);
//! while let Some(update) = updates.recv().await {
//!     println!("{:.5},{:.5}", update.fix.latitude, update.fix.longitude);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod input;
pub mod playback;
pub mod source;

pub use crate::core::{format_timestamp, parse_timestamp, LocationFix, TIMESTAMP_FORMAT};
pub use crate::error::ReplayError;
pub use crate::input::{decode_track, detect_format, load_file, TrackFormat};
pub use crate::playback::{PlaybackConfig, ReplayEngine};
pub use crate::source::{
    LocationSource, LocationUpdate, SimulatedLocationSource, SimulationManager, SimulationStats,
    SourceResult, SourceStatus, DEFAULT_POLL_INTERVAL,
};
