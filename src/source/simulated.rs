use async_trait::async_trait;

use crate::core::LocationFix;
use crate::error::ReplayError;
use crate::playback::ReplayEngine;
use crate::source::{LocationSource, SourceResult, SourceStatus};

/// Location source that replays a recorded track
///
/// Stands in for a live positioning feed by walking a recorded track at the
/// engine's playback speed. Starting the source anchors the replay; every
/// subsequent query reports the fix active at that moment.
pub struct SimulatedLocationSource {
    name: String,
    engine: ReplayEngine,
}

impl SimulatedLocationSource {
    /// Create a source over a constructed replay engine
    pub fn new(name: &str, engine: ReplayEngine) -> Self {
        Self {
            name: name.to_string(),
            engine,
        }
    }

    /// Create a source directly from raw JSON track bytes
    pub fn from_json(name: &str, data: &[u8], speed: f64) -> Result<Self, ReplayError> {
        Ok(Self::new(name, ReplayEngine::from_json(data, speed)?))
    }

    /// Create a source directly from raw CSV track bytes
    pub fn from_csv(name: &str, data: &[u8], speed: f64) -> Result<Self, ReplayError> {
        Ok(Self::new(name, ReplayEngine::from_csv(data, speed)?))
    }

    /// Access the underlying replay engine
    pub fn engine(&self) -> &ReplayEngine {
        &self.engine
    }
}

#[async_trait]
impl LocationSource for SimulatedLocationSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> SourceStatus {
        if self.engine.is_started() {
            SourceStatus::Started
        } else {
            SourceStatus::Unstarted
        }
    }

    async fn start(&mut self) -> SourceResult<()> {
        self.engine.start();
        Ok(())
    }

    async fn current_location(&mut self) -> SourceResult<LocationFix> {
        self.engine.current_location()
    }
}
