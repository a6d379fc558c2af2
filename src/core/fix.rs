use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReplayError;

/// Timestamp layout used by recorded tracks, e.g. `2015-01-23T10:15:30.123`.
///
/// The layout carries no zone designator; instants are interpreted as UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// One recorded location sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Altitude in meters
    pub altitude: f64,

    /// Horizontal accuracy radius in meters, negative when unknown
    pub horizontal_accuracy: f64,

    /// Vertical accuracy in meters, negative when unknown
    pub vertical_accuracy: f64,

    /// Course over ground in degrees (0-360), negative when unknown
    pub course: f64,

    /// Speed in meters per second, negative when unknown
    pub speed: f64,

    /// Instant the fix was recorded, UTC
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    /// Check if the course field holds a usable direction
    pub fn course_known(&self) -> bool {
        self.course >= 0.0
    }

    /// Check if the speed field holds a usable value
    pub fn speed_known(&self) -> bool {
        self.speed >= 0.0
    }

    /// Check if the horizontal accuracy field holds a usable radius
    pub fn horizontal_accuracy_known(&self) -> bool {
        self.horizontal_accuracy >= 0.0
    }

    /// Simulated instant at which this fix becomes active.
    ///
    /// The recorded elapsed time since `recording_start` is divided by
    /// `playback_speed` (2.0 plays back twice as fast) and added to
    /// `simulation_start`. Millisecond arithmetic, matching the precision
    /// of the recorded timestamp layout.
    ///
    /// `playback_speed` must be strictly positive and `recording_start`
    /// must not be later than this fix's timestamp.
    pub fn simulated_instant(
        &self,
        recording_start: DateTime<Utc>,
        playback_speed: f64,
        simulation_start: DateTime<Utc>,
    ) -> DateTime<Utc> {
        debug_assert!(playback_speed > 0.0);
        debug_assert!(recording_start <= self.timestamp);

        let recorded_ms = (self.timestamp - recording_start).num_milliseconds();
        let simulated_ms = (recorded_ms as f64 / playback_speed).round() as i64;
        simulation_start + Duration::milliseconds(simulated_ms)
    }

    /// Re-anchor this fix against a simulation start instant.
    ///
    /// Returns a copy whose timestamp is the fix's simulated instant;
    /// position and motion attributes pass through unchanged.
    pub fn offset_from(
        &self,
        recording_start: DateTime<Utc>,
        playback_speed: f64,
        simulation_start: DateTime<Utc>,
    ) -> LocationFix {
        LocationFix {
            timestamp: self.simulated_instant(recording_start, playback_speed, simulation_start),
            ..self.clone()
        }
    }
}

/// Parse a recorded-track timestamp into an absolute UTC instant.
///
/// Malformed input is reported as an error, never mapped to a default
/// instant.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ReplayError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ReplayError::MalformedTimestamp {
            text: text.to_string(),
        })
}

/// Format an instant in the recorded-track timestamp layout.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(timestamp: DateTime<Utc>) -> LocationFix {
        LocationFix {
            latitude: 37.3318,
            longitude: -122.0312,
            altitude: 12.5,
            horizontal_accuracy: 5.0,
            vertical_accuracy: 10.0,
            course: 270.0,
            speed: 1.4,
            timestamp,
        }
    }

    #[test]
    fn test_parse_timestamp() {
        let instant = parse_timestamp("2015-01-23T10:15:30.123").unwrap();
        assert_eq!(format_timestamp(instant), "2015-01-23T10:15:30.123");
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let original = parse_timestamp("2015-01-23T00:00:00.000").unwrap();
        let instant = original + Duration::milliseconds(86_399_999);
        assert_eq!(parse_timestamp(&format_timestamp(instant)).unwrap(), instant);
    }

    #[test]
    fn test_parse_timestamp_malformed() {
        for text in ["not-a-date", "", "2015-01-23", "10:15:30.123"] {
            let err = parse_timestamp(text).unwrap_err();
            assert!(matches!(err, ReplayError::MalformedTimestamp { .. }), "{:?}", text);
        }
    }

    #[test]
    fn test_offset_passes_attributes_through() {
        let start = parse_timestamp("2015-01-23T10:00:00.000").unwrap();
        let fix = fix_at(start + Duration::seconds(10));
        let sim_start = parse_timestamp("2020-06-01T08:30:00.000").unwrap();

        let offset = fix.offset_from(start, 2.0, sim_start);
        assert_eq!(offset.timestamp, sim_start + Duration::seconds(5));
        assert_eq!(offset.latitude, fix.latitude);
        assert_eq!(offset.longitude, fix.longitude);
        assert_eq!(offset.altitude, fix.altitude);
        assert_eq!(offset.horizontal_accuracy, fix.horizontal_accuracy);
        assert_eq!(offset.vertical_accuracy, fix.vertical_accuracy);
        assert_eq!(offset.course, fix.course);
        assert_eq!(offset.speed, fix.speed);
    }

    #[test]
    fn test_doubling_speed_halves_offsets() {
        let start = parse_timestamp("2015-01-23T10:00:00.000").unwrap();
        let sim_start = parse_timestamp("2020-06-01T08:30:00.000").unwrap();

        for secs in [0, 3, 10, 60, 3600] {
            let fix = fix_at(start + Duration::seconds(secs));
            let at_1x = fix.simulated_instant(start, 1.0, sim_start) - sim_start;
            let at_2x = fix.simulated_instant(start, 2.0, sim_start) - sim_start;
            assert_eq!(at_1x.num_milliseconds(), 2 * at_2x.num_milliseconds());
        }
    }

    #[test]
    fn test_simulated_instants_monotonic() {
        let start = parse_timestamp("2015-01-23T10:00:00.000").unwrap();
        let sim_start = parse_timestamp("2020-06-01T08:30:00.000").unwrap();

        let instants: Vec<_> = [0, 1, 4, 9, 25]
            .iter()
            .map(|&secs| fix_at(start + Duration::seconds(secs)))
            .map(|fix| fix.simulated_instant(start, 1.5, sim_start))
            .collect();
        assert!(instants.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_unknown_sentinels() {
        let mut fix = fix_at(Utc::now());
        assert!(fix.course_known());
        assert!(fix.speed_known());
        assert!(fix.horizontal_accuracy_known());

        fix.course = -1.0;
        fix.speed = -1.0;
        fix.horizontal_accuracy = -1.0;
        assert!(!fix.course_known());
        assert!(!fix.speed_known());
        assert!(!fix.horizontal_accuracy_known());
    }
}
