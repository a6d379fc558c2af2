pub mod csv;
pub mod json;

pub use csv::decode_csv;
pub use json::decode_json;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::core::LocationFix;
use crate::error::ReplayError;

/// Input format detection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackFormat {
    Json,
    Csv,
    Unknown,
}

/// Detect the format of a track by inspecting the leading bytes
pub fn detect_format(data: &[u8]) -> TrackFormat {
    let first = data.iter().find(|b| !b.is_ascii_whitespace());
    match first {
        Some(b'[') | Some(b'{') => TrackFormat::Json,
        Some(_) if is_csv(data) => TrackFormat::Csv,
        _ => TrackFormat::Unknown,
    }
}

fn is_csv(data: &[u8]) -> bool {
    // Check if the data looks like CSV (text with commas)
    if data.len() < 10 {
        return false;
    }

    match std::str::from_utf8(&data[..data.len().min(500)]) {
        Ok(text) => text
            .lines()
            .take(5)
            .any(|line| line.chars().filter(|&c| c == ',').count() >= 2),
        Err(_) => false,
    }
}

/// Decode a raw track, auto-detecting its format
pub fn decode_track(data: &[u8]) -> Result<Vec<LocationFix>, ReplayError> {
    match detect_format(data) {
        TrackFormat::Json => decode_json(data),
        TrackFormat::Csv => decode_csv(data),
        TrackFormat::Unknown => Err(ReplayError::Decode("unrecognized track format".to_string())),
    }
}

/// Load a recorded track from a file, auto-detecting its format
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<LocationFix>> {
    let path = path.as_ref();
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let fixes =
        decode_track(&data).with_context(|| format!("failed to decode {}", path.display()))?;
    info!("loaded {} fixes from {}", fixes.len(), path.display());
    Ok(fixes)
}
