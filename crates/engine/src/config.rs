//! Engine configuration

use secretnum_fixed_point::DEFAULT_SCALE;
use serde::{Deserialize, Serialize};

/// Configuration for an engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixed-point scale exponent for arithmetic shares (value = raw / 2^scale)
    pub scale: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}
