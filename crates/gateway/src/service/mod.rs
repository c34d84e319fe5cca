use log::debug;

pub mod observations;
pub mod stations;

/// Side channel for station display-name disagreements between the two
/// parameter feeds. The merge keeps the temperature name either way; the
/// sink only records the discrepancy.
pub trait NameMismatchSink: Send + Sync {
    fn record(&self, station_id: &str, temperature_name: &str, wind_name: &str);
}

/// Production sink, logs mismatches at debug level
pub struct LogMismatchSink;

impl NameMismatchSink for LogMismatchSink {
    fn record(&self, station_id: &str, temperature_name: &str, wind_name: &str) {
        debug!(
            "station name mismatch for {}: temperature={}, wind={}",
            station_id, temperature_name, wind_name
        );
    }
}
