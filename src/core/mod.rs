pub mod fix;

pub use fix::{format_timestamp, parse_timestamp, LocationFix, TIMESTAMP_FORMAT};
