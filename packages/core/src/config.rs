//! Configuration for the drag-and-drop engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default fraction of a row's height that counts as the before/after band
pub const DEFAULT_ZONE_THRESHOLD: f64 = 0.25;

/// Gap between consecutive order indices after a renumber
pub const DEFAULT_ORDER_STRIDE: i64 = 1000;

/// Largest accepted stride; leaves room for a million siblings per group
pub const MAX_ORDER_STRIDE: i64 = i64::MAX / 1_000_000;

/// Upper bound on parent-chain walks; a longer chain is treated as a cycle
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("zone_threshold must be in (0, 0.5], got {0}")]
    InvalidThreshold(f64),

    #[error("order_stride must be in 1..={max}, got {0}", max = MAX_ORDER_STRIDE)]
    InvalidStride(i64),

    #[error("max_depth must be greater than 0")]
    InvalidMaxDepth,

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables shared by the geometry classifier, tree model and planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of the target height reserved for before/after at each edge
    pub zone_threshold: f64,

    /// Stride used when the planner renumbers a sibling group
    pub order_stride: i64,

    /// Maximum parent-chain length before a chain is considered cyclic
    pub max_depth: usize,

    /// Message passed to the notifier when a mutation is rolled back
    pub rollback_message: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zone_threshold: DEFAULT_ZONE_THRESHOLD,
            order_stride: DEFAULT_ORDER_STRIDE,
            max_depth: DEFAULT_MAX_DEPTH,
            rollback_message: "Couldn't save the new order. Changes were reverted.".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A threshold above one half would make the bands overlap.
        if !(self.zone_threshold > 0.0 && self.zone_threshold <= 0.5) {
            return Err(ConfigError::InvalidThreshold(self.zone_threshold));
        }

        validate_stride(self.order_stride)?;

        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }

        Ok(())
    }
}

/// Check a renumbering stride is positive and cannot overflow small groups
pub fn validate_stride(stride: i64) -> Result<(), ConfigError> {
    if stride <= 0 || stride > MAX_ORDER_STRIDE {
        return Err(ConfigError::InvalidStride(stride));
    }
    Ok(())
}
