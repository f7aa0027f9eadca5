//! Engine configuration types
//!
//! The engine needs very little configuration: the magnitude threshold that
//! starts a motion session, the noise filter for short sessions, and how many
//! malformed lines to keep as examples.

use crate::types::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for segmentation and diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sample magnitude above which the device counts as moving (log units, usually g)
    #[serde(default = "default_activation_threshold")]
    pub activation_threshold: f64,

    /// Sessions shorter than this many seconds are rejected as noise
    #[serde(default = "default_min_session_duration")]
    pub min_session_duration_secs: f64,

    /// Number of malformed lines kept verbatim in the diagnostics
    #[serde(default = "default_max_malformed_examples")]
    pub max_malformed_examples: usize,
}

fn default_activation_threshold() -> f64 {
    0.1
}

fn default_min_session_duration() -> f64 {
    1.0
}

fn default_max_malformed_examples() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activation_threshold: default_activation_threshold(),
            min_session_duration_secs: default_min_session_duration(),
            max_malformed_examples: default_max_malformed_examples(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the activation threshold
    pub fn with_activation_threshold(mut self, threshold: f64) -> Self {
        self.activation_threshold = threshold;
        self
    }

    /// Builder method: set the minimum session duration in seconds
    pub fn with_min_session_duration(mut self, secs: f64) -> Self {
        self.min_session_duration_secs = secs;
        self
    }

    /// Builder method: set how many malformed lines are kept as examples
    pub fn with_max_malformed_examples(mut self, count: usize) -> Self {
        self.max_malformed_examples = count;
        self
    }

    /// Reject thresholds and durations that would make segmentation meaningless
    pub fn validate(&self) -> Result<()> {
        if !self.activation_threshold.is_finite() || self.activation_threshold < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "activation_threshold must be a finite, non-negative number (got {})",
                self.activation_threshold
            )));
        }
        if !self.min_session_duration_secs.is_finite() || self.min_session_duration_secs < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "min_session_duration_secs must be a finite, non-negative number (got {})",
                self.min_session_duration_secs
            )));
        }
        Ok(())
    }
}
