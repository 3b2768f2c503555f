//! Sensor Pipeline - Main Entry Point

mod config;
mod sink;
mod workers;

use std::sync::Arc;
use std::thread;

use shared_buffer::SharedBuffer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::PipelineConfig;
use crate::sink::LogSink;

/// Initialize logging
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Sensor Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let config = PipelineConfig::load()?;
    info!(
        readings = config.reading_count,
        sensors = config.sensor_count,
        "configuration loaded"
    );

    let buffer = Arc::new(SharedBuffer::new(config.buffer.clone()));

    let producer = {
        let buffer = Arc::clone(&buffer);
        let config = config.clone();
        thread::spawn(move || workers::run_producer(&buffer, &config))
    };
    let reader = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || {
            let mut sink = LogSink;
            workers::run_reader(&buffer, &mut sink)
        })
    };
    let remover = {
        let buffer = Arc::clone(&buffer);
        let config = config.clone();
        thread::spawn(move || workers::run_remover(&buffer, &config))
    };

    // Shutdown is signalled by the producer; join everything before the
    // buffer is dropped.
    producer.join().map_err(|_| "producer thread panicked")??;
    let observed = reader.join().map_err(|_| "read role thread panicked")??;
    let reclaimed = remover.join().map_err(|_| "remove role thread panicked")??;

    info!(observed, reclaimed, "pipeline drained, exiting");
    Ok(())
}
