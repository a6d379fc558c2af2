use thiserror::Error;

/// Errors produced while decoding a recorded track or querying playback.
///
/// All conditions are local, synchronous and non-retryable; callers decide
/// whether to rebuild the engine with corrected input.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A timestamp string did not match the track's fixed layout.
    #[error("malformed timestamp {text:?}")]
    MalformedTimestamp { text: String },

    /// The input bytes did not decode into the expected record shape.
    #[error("failed to decode track: {0}")]
    Decode(String),

    /// Decoding produced no records, so there is no recording start to
    /// anchor playback offsets to.
    #[error("track contains no fixes")]
    EmptySequence,

    /// The engine was queried before playback was started.
    #[error("playback has not been started")]
    NotStarted,
}
