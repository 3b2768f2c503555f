//! Collaborator thread bodies.
//!
//! Each body begins with the startup rendezvous so no role runs ahead
//! of the others, then loops until termination is observed and any
//! remaining data has drained.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use shared_buffer::{BufferError, Cursor, SensorReading, SharedBuffer, WaitOutcome};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::sink::ReadingSink;

/// Producer role: inserts one synthetic reading per acquisition tick,
/// then signals shutdown once the configured count is reached.
pub fn run_producer(
    buffer: &SharedBuffer<SensorReading>,
    config: &PipelineConfig,
) -> Result<(), BufferError> {
    buffer.wait_ready();
    info!(count = config.reading_count, "producer started");
    let interval = Duration::from_millis(config.produce_interval_ms);
    for seq in 0..config.reading_count {
        buffer.insert(synth_reading(seq, config.sensor_count))?;
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
    info!("producer done, signalling shutdown");
    buffer.shutdown()
}

/// Read role: blocks for data, forwards every reading to the sink in
/// insertion order, and drains whatever is left once terminated.
pub fn run_reader(
    buffer: &SharedBuffer<SensorReading>,
    sink: &mut dyn ReadingSink,
) -> Result<u64, BufferError> {
    buffer.wait_ready();
    let mut observed = 0u64;
    loop {
        let outcome = buffer.wait_for_data(Cursor::NextRead)?;
        while let Some(reading) = buffer.try_read()? {
            sink.consume(&reading);
            observed += 1;
        }
        if outcome == WaitOutcome::Terminated {
            info!(observed, "read role finished");
            return Ok(observed);
        }
    }
}

/// Remove role: polls for readings the read role has already observed,
/// backing off when none are ready yet, until the buffer is terminated
/// and fully drained.
pub fn run_remover(
    buffer: &SharedBuffer<SensorReading>,
    config: &PipelineConfig,
) -> Result<u64, BufferError> {
    buffer.wait_ready();
    let backoff = Duration::from_millis(config.remove_backoff_ms);
    let mut reclaimed = 0u64;
    loop {
        match buffer.try_remove()? {
            Some(reading) => {
                debug!(sensor_id = reading.sensor_id, "reading reclaimed");
                reclaimed += 1;
            }
            None => {
                if buffer.is_terminated()? && buffer.is_empty()? {
                    info!(reclaimed, "remove role finished");
                    return Ok(reclaimed);
                }
                thread::sleep(backoff);
            }
        }
    }
}

fn synth_reading(seq: u32, sensor_count: u16) -> SensorReading {
    let sensor_id = (seq % u32::from(sensor_count.max(1))) as u16;
    SensorReading {
        sensor_id,
        value: 20.0 + f64::from(sensor_id) * 0.5 + f64::from(seq) * 0.01,
        timestamp_ms: now_ms(),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectSink;
    use std::sync::Arc;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            sensor_count: 4,
            reading_count: 50,
            produce_interval_ms: 0,
            remove_backoff_ms: 1,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_three_roles_drain_everything_in_order() {
        let config = test_config();
        let buffer = Arc::new(SharedBuffer::new(config.buffer.clone()));

        let producer = {
            let buffer = Arc::clone(&buffer);
            let config = config.clone();
            thread::spawn(move || run_producer(&buffer, &config))
        };
        let reader = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut sink = CollectSink::default();
                run_reader(&buffer, &mut sink).map(|observed| (observed, sink.readings))
            })
        };
        let remover = {
            let buffer = Arc::clone(&buffer);
            let config = config.clone();
            thread::spawn(move || run_remover(&buffer, &config))
        };

        producer.join().unwrap().unwrap();
        let (observed, readings) = reader.join().unwrap().unwrap();
        let reclaimed = remover.join().unwrap().unwrap();

        assert_eq!(observed, 50);
        assert_eq!(reclaimed, 50);
        assert!(buffer.is_empty().unwrap());
        // Insertion order survives end to end: sensor ids cycle with seq.
        for (i, reading) in readings.iter().enumerate() {
            assert_eq!(reading.sensor_id, (i % 4) as u16);
        }
    }

    #[test]
    fn test_synth_reading_cycles_sensor_ids() {
        assert_eq!(synth_reading(0, 4).sensor_id, 0);
        assert_eq!(synth_reading(5, 4).sensor_id, 1);
        assert_eq!(synth_reading(7, 1).sensor_id, 0);
    }
}
