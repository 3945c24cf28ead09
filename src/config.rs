//! Engine configuration parameters.
//!
//! All tunable parameters of the sampling engine. Hosts may persist and
//! hot-load this struct (it derives serde), but the engine only ever sees
//! values that passed [`SimtempConfig::validate`] — setters reject rather
//! than clamp, so a misbehaving control channel cannot inject an absurd
//! sampling rate or threshold.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::Mode;

/// Sampling period bounds (milliseconds).
pub const SAMPLING_MS_MIN: u32 = 1;
pub const SAMPLING_MS_MAX: u32 = 10_000;

/// Alert threshold bounds (milli-degrees Celsius).
pub const THRESHOLD_MC_MIN: i32 = -20_000;
pub const THRESHOLD_MC_MAX: i32 = 60_000;

/// Core engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimtempConfig {
    /// Sampling period in milliseconds. Changes apply from the next tick.
    pub sampling_ms: u32,
    /// Alert threshold in milli-degrees Celsius. A sample whose reading is
    /// at or above this value carries the THRESHOLD_CROSSED flag.
    pub threshold_mc: i32,
    /// Operating mode of the generator.
    pub mode: Mode,
}

impl Default for SimtempConfig {
    fn default() -> Self {
        Self {
            sampling_ms: 100,
            threshold_mc: 45_000,
            mode: Mode::Normal,
        }
    }
}

impl SimtempConfig {
    /// Check every field against its legal range.
    pub fn validate(&self) -> Result<()> {
        validate_sampling_ms(self.sampling_ms)?;
        validate_threshold_mc(self.threshold_mc)?;
        Ok(())
    }
}

/// Range check for the sampling period.
pub fn validate_sampling_ms(v: u32) -> Result<()> {
    if (SAMPLING_MS_MIN..=SAMPLING_MS_MAX).contains(&v) {
        Ok(())
    } else {
        Err(Error::Invalid("sampling_ms must be within 1..=10000"))
    }
}

/// Range check for the alert threshold.
pub fn validate_threshold_mc(v: i32) -> Result<()> {
    if (THRESHOLD_MC_MIN..=THRESHOLD_MC_MAX).contains(&v) {
        Ok(())
    } else {
        Err(Error::Invalid("threshold_mC must be within -20000..=60000"))
    }
}
