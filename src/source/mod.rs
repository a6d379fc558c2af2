pub mod manager;
pub mod simulated;

pub use manager::{LocationUpdate, SimulationManager, SimulationStats, DEFAULT_POLL_INTERVAL};
pub use simulated::SimulatedLocationSource;

use async_trait::async_trait;

use crate::core::LocationFix;
use crate::error::ReplayError;

/// Result type for location source operations
pub type SourceResult<T> = Result<T, ReplayError>;

/// Lifecycle state of a location source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceStatus {
    /// Source has not been started
    Unstarted,
    /// Source is producing locations
    Started,
}

/// Trait for location source implementations
///
/// This trait provides a common interface for anything that can stand in
/// for a device's location feed:
/// - simulated sources replaying a recorded track
/// - platform adapters wrapping a real positioning service
#[async_trait]
pub trait LocationSource: Send {
    /// Name/identifier of this source
    fn name(&self) -> &str;

    /// Current lifecycle state
    fn status(&self) -> SourceStatus;

    /// Begin producing locations
    async fn start(&mut self) -> SourceResult<()>;

    /// The location this source reports right now
    async fn current_location(&mut self) -> SourceResult<LocationFix>;
}
