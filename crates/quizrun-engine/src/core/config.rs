//! Runtime tuning for generation and sequencing.
//! Loaded from a JSON string by the hosting page, so difficulty can be
//! adjusted without rebuilding the WASM module.

use serde::{Deserialize, Serialize};

use crate::terrain::obstacles::ObstacleParams;

/// Tuning knobs with gameplay-tested defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineTuning {
    /// Obstacle corridor generation parameters.
    #[serde(default)]
    pub obstacle: ObstacleParams,
    /// Precomputed obstacle batches to keep on hand.
    #[serde(default = "default_buffer_depth")]
    pub buffer_depth: usize,
    /// Queue length at or below which a deferred refill is scheduled.
    #[serde(default = "default_buffer_low_water")]
    pub buffer_low_water: usize,
    /// Question/obstacle pairs appended at bootstrap.
    #[serde(default = "default_bootstrap_pairs")]
    pub bootstrap_pairs: usize,
    /// Ease power for the question-section deceleration curve.
    #[serde(default = "default_decel_power")]
    pub decel_power: f32,
    /// Rows of full speed after a question section starts, before the
    /// deceleration window opens.
    #[serde(default = "default_decel_delay_rows")]
    pub decel_delay_rows: f32,
}

fn default_buffer_depth() -> usize {
    10
}
fn default_buffer_low_water() -> usize {
    4
}
fn default_bootstrap_pairs() -> usize {
    3
}
fn default_decel_power() -> f32 {
    6.0
}
fn default_decel_delay_rows() -> f32 {
    6.0
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            obstacle: ObstacleParams::default(),
            buffer_depth: default_buffer_depth(),
            buffer_low_water: default_buffer_low_water(),
            bootstrap_pairs: default_bootstrap_pairs(),
            decel_power: default_decel_power(),
            decel_delay_rows: default_decel_delay_rows(),
        }
    }
}

impl EngineTuning {
    /// Parse tuning from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
