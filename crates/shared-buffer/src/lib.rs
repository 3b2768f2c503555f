//! Shared Sensor Buffer
//!
//! Unbounded FIFO buffer handing sensor readings from a single producer
//! thread to two consumer roles: a read role that observes every element
//! exactly once in insertion order, and a remove role that reclaims
//! elements the read role has already passed.

mod buffer;
mod chain;
mod error;

pub use buffer::{BufferConfig, Cursor, SharedBuffer, WaitOutcome};
pub use error::BufferError;

use serde::{Deserialize, Serialize};

/// Sensor reading stored in the shared buffer. The buffer never
/// interprets its contents; it is copied in on insert and copied out on
/// read and remove.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: u16,
    pub value: f64,
    pub timestamp_ms: u64,
}
