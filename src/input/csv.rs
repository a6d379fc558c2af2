use chrono::{DateTime, Duration, Utc};

use crate::core::{parse_timestamp, LocationFix};
use crate::error::ReplayError;

/// Resolved column indices for a CSV track
///
/// Time, latitude and longitude are required; the motion and accuracy
/// columns fall back to the platform's "unknown" sentinels when absent.
struct Columns {
    time: usize,
    latitude: usize,
    longitude: usize,
    altitude: Option<usize>,
    horizontal_accuracy: Option<usize>,
    vertical_accuracy: Option<usize>,
    course: Option<usize>,
    speed: Option<usize>,
}

/// Decode a CSV track into location fixes
///
/// Supports flexible column headers (`lat`/`latitude`, `lon`/`longitude`,
/// ...). Timestamps are either the fixed textual layout used by JSON tracks
/// or relative seconds from the start of the recording; relative tracks are
/// anchored at the Unix epoch, which leaves the offsets between fixes (the
/// only thing replay consumes) intact.
pub fn decode_csv(data: &[u8]) -> Result<Vec<LocationFix>, ReplayError> {
    let mut rdr = csv::Reader::from_reader(data);

    let headers = rdr
        .headers()
        .map_err(|e| ReplayError::Decode(e.to_string()))?
        .clone();
    let columns = detect_columns(&headers)?;

    let mut fixes = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| ReplayError::Decode(e.to_string()))?;
        fixes.push(fix_from_record(&record, &columns)?);
    }

    if fixes.is_empty() {
        return Err(ReplayError::EmptySequence);
    }

    Ok(fixes)
}

fn fix_from_record(
    record: &csv::StringRecord,
    columns: &Columns,
) -> Result<LocationFix, ReplayError> {
    Ok(LocationFix {
        latitude: float_field(record, columns.latitude, "latitude")?,
        longitude: float_field(record, columns.longitude, "longitude")?,
        altitude: optional_float_field(record, columns.altitude, 0.0)?,
        horizontal_accuracy: optional_float_field(record, columns.horizontal_accuracy, -1.0)?,
        vertical_accuracy: optional_float_field(record, columns.vertical_accuracy, -1.0)?,
        course: optional_float_field(record, columns.course, -1.0)?,
        speed: optional_float_field(record, columns.speed, -1.0)?,
        timestamp: time_field(record, columns.time)?,
    })
}

/// Detect column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<Columns, ReplayError> {
    Ok(Columns {
        time: find_column(headers, &["time", "timestamp", "t", "ts"])?,
        latitude: find_column(headers, &["lat", "latitude"])?,
        longitude: find_column(headers, &["lon", "lng", "long", "longitude"])?,
        altitude: find_column(headers, &["alt", "altitude", "elevation"]).ok(),
        horizontal_accuracy: find_column(headers, &["hacc", "h_acc", "horizontal_accuracy", "accuracy"]).ok(),
        vertical_accuracy: find_column(headers, &["vacc", "v_acc", "vertical_accuracy"]).ok(),
        course: find_column(headers, &["course", "heading", "bearing"]).ok(),
        speed: find_column(headers, &["speed", "velocity"]).ok(),
    })
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Result<usize, ReplayError> {
    for (idx, header) in headers.iter().enumerate() {
        let header_lower = header.trim().to_lowercase();
        if names.iter().any(|&name| header_lower == name) {
            return Ok(idx);
        }
    }

    Err(ReplayError::Decode(format!(
        "could not find column with names: {:?}",
        names
    )))
}

fn time_field(record: &csv::StringRecord, idx: usize) -> Result<DateTime<Utc>, ReplayError> {
    let cell = record
        .get(idx)
        .ok_or_else(|| ReplayError::Decode("row is missing the time column".to_string()))?
        .trim();

    if let Ok(instant) = parse_timestamp(cell) {
        return Ok(instant);
    }

    cell.parse::<f64>()
        .map(|secs| DateTime::UNIX_EPOCH + Duration::milliseconds((secs * 1000.0).round() as i64))
        .map_err(|_| ReplayError::MalformedTimestamp {
            text: cell.to_string(),
        })
}

fn float_field(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, ReplayError> {
    let cell = record
        .get(idx)
        .ok_or_else(|| ReplayError::Decode(format!("row is missing the {} column", name)))?
        .trim();

    cell.parse::<f64>()
        .map_err(|_| ReplayError::Decode(format!("invalid {} value {:?}", name, cell)))
}

fn optional_float_field(
    record: &csv::StringRecord,
    idx: Option<usize>,
    default: f64,
) -> Result<f64, ReplayError> {
    match idx {
        Some(idx) => {
            let cell = record.get(idx).map(str::trim).unwrap_or("");
            if cell.is_empty() {
                return Ok(default);
            }
            cell.parse::<f64>()
                .map_err(|_| ReplayError::Decode(format!("invalid value {:?}", cell)))
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_relative_seconds() {
        let data = b"time,lat,lon,alt,speed\n0.0,37.3318,-122.0312,12.5,1.4\n1.5,37.3320,-122.0315,12.7,1.6\n";
        let fixes = decode_csv(data).unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[0].latitude, 37.3318);
        assert_eq!(fixes[0].altitude, 12.5);
        assert_eq!((fixes[1].timestamp - fixes[0].timestamp).num_milliseconds(), 1500);
        // absent columns fall back to the unknown sentinel
        assert!(!fixes[0].course_known());
        assert!(!fixes[0].horizontal_accuracy_known());
    }

    #[test]
    fn test_decode_absolute_timestamps() {
        let data = b"timestamp,latitude,longitude,course\n2015-01-23T10:15:30.123,1.0,2.0,90.0\n2015-01-23T10:15:31.123,1.1,2.1,91.0\n";
        let fixes = decode_csv(data).unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[0].course, 90.0);
        assert_eq!((fixes[1].timestamp - fixes[0].timestamp).num_seconds(), 1);
    }

    #[test]
    fn test_missing_required_column() {
        let data = b"time,lat\n0.0,37.0\n";
        let err = decode_csv(data).unwrap_err();
        assert!(matches!(err, ReplayError::Decode(_)));
    }

    #[test]
    fn test_header_only_is_empty() {
        let data = b"time,lat,lon\n";
        let err = decode_csv(data).unwrap_err();
        assert!(matches!(err, ReplayError::EmptySequence));
    }

    #[test]
    fn test_unparseable_time_cell() {
        let data = b"time,lat,lon\nnoon-ish,1.0,2.0\n";
        let err = decode_csv(data).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedTimestamp { .. }));
    }
}
