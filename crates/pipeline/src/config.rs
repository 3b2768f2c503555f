//! Pipeline configuration

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use shared_buffer::BufferConfig;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of distinct simulated sensors
    pub sensor_count: u16,

    /// Total readings the producer inserts before signalling shutdown
    pub reading_count: u32,

    /// Delay between produced readings (milliseconds, 0 = flat out)
    pub produce_interval_ms: u64,

    /// Remove-role backoff after a "no data yet" poll (milliseconds)
    pub remove_backoff_ms: u64,

    /// Shared buffer settings. `barrier_parties` must match the number
    /// of collaborator threads the pipeline spawns (three).
    pub buffer: BufferConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sensor_count: 8,
            reading_count: 200,
            produce_interval_ms: 5,
            remove_backoff_ms: 2,
            buffer: BufferConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Layers defaults, an optional `pipeline.toml`, and `PIPELINE_*`
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&PipelineConfig::default())?)
            .add_source(File::with_name("pipeline").required(false))
            .add_source(Environment::with_prefix("PIPELINE").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_three_collaborators() {
        let config = PipelineConfig::default();
        assert_eq!(config.buffer.barrier_parties, 3);
        assert!(config.reading_count > 0);
    }
}
