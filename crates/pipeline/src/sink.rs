//! Downstream sinks for the read role.

use shared_buffer::SensorReading;
use tracing::info;

/// Destination for readings delivered by the read role. Aggregation,
/// filtering, and persistence live behind this boundary.
pub trait ReadingSink {
    fn consume(&mut self, reading: &SensorReading);
}

/// Logs each reading as it arrives.
pub struct LogSink;

impl ReadingSink for LogSink {
    fn consume(&mut self, reading: &SensorReading) {
        info!(
            sensor_id = reading.sensor_id,
            value = reading.value,
            timestamp_ms = reading.timestamp_ms,
            "reading observed"
        );
    }
}

/// Collects readings in memory, mainly for tests.
#[derive(Default)]
pub struct CollectSink {
    pub readings: Vec<SensorReading>,
}

impl ReadingSink for CollectSink {
    fn consume(&mut self, reading: &SensorReading) {
        self.readings.push(*reading);
    }
}
