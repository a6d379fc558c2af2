use serde::Deserialize;

use crate::core::{parse_timestamp, LocationFix};
use crate::error::ReplayError;

/// Wire shape of one recorded fix
///
/// Field names follow the recorder's snake_case output; the camelCase
/// spelling used by older track dumps is accepted as an alias.
#[derive(Debug, Deserialize)]
struct RawFix {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    #[serde(alias = "horizontalAccuracy")]
    horizontal_accuracy: f64,
    #[serde(alias = "verticalAccuracy")]
    vertical_accuracy: f64,
    course: f64,
    speed: f64,
    timestamp: String,
}

/// Decode a JSON track into location fixes
///
/// The input is an array of fix objects. A schema mismatch (missing field,
/// wrong type, not an array) is a decode error; a timestamp string that does
/// not match the track layout is reported as malformed; an empty array has
/// no recording start to anchor playback and is rejected outright.
pub fn decode_json(data: &[u8]) -> Result<Vec<LocationFix>, ReplayError> {
    let raw: Vec<RawFix> =
        serde_json::from_slice(data).map_err(|e| ReplayError::Decode(e.to_string()))?;

    if raw.is_empty() {
        return Err(ReplayError::EmptySequence);
    }

    raw.into_iter().map(fix_from_raw).collect()
}

fn fix_from_raw(raw: RawFix) -> Result<LocationFix, ReplayError> {
    Ok(LocationFix {
        latitude: raw.latitude,
        longitude: raw.longitude,
        altitude: raw.altitude,
        horizontal_accuracy: raw.horizontal_accuracy,
        vertical_accuracy: raw.vertical_accuracy,
        course: raw.course,
        speed: raw.speed,
        timestamp: parse_timestamp(&raw.timestamp)?,
    })
}
