//! Simulated temperature generator.
//!
//! Pure step functions keyed by operating mode. Each tick the engine feeds
//! the previous reading through [`advance`] and stores the result; nothing
//! here touches the engine mutex or the clock, which keeps every waveform
//! testable as plain arithmetic.
//!
//! All values are milli-degrees Celsius (mC).
//!
//! ## Waveforms
//!
//! | Mode   | Step          | Range            | Shape      |
//! |--------|---------------|------------------|------------|
//! | Normal | +10           | [44000, 46010]   | saw-tooth  |
//! | Noisy  | ±U(0..=100)   | [44000, 46000]   | random     |
//! | Ramp   | ±50           | [44000, 46000]   | triangular |
//!
//! Normal wraps to 44000 on the step **after** passing 46000, so the peak
//! reading 46010 is observable exactly once per period.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Waveform constants
// ---------------------------------------------------------------------------

/// Reading at engine creation and at every Normal-mode wrap.
pub const BASE_TEMP_MC: i32 = 44_000;

/// Normal mode: increment per tick.
const NORMAL_STEP_MC: i32 = 10;
/// Normal mode: highest reading before the wrap back to [`BASE_TEMP_MC`].
const NORMAL_PEAK_MC: i32 = 46_010;

/// Noisy mode: maximum absolute offset per tick.
const NOISY_SPAN_MC: i32 = 100;
/// Noisy mode: clamp bounds.
const NOISY_MIN_MC: i32 = 44_000;
const NOISY_MAX_MC: i32 = 46_000;

/// Ramp mode: increment magnitude per tick.
const RAMP_STEP_MC: i32 = 50;
/// Ramp mode: turnaround bounds.
const RAMP_MIN_MC: i32 = 44_000;
const RAMP_MAX_MC: i32 = 46_000;

// ---------------------------------------------------------------------------
// Operating mode
// ---------------------------------------------------------------------------

/// Operating mode of the simulated sensor.
///
/// A tagged enum: token validation happens once at the setter boundary,
/// the tick reads the tag directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Slow saw-tooth, +10 mC per tick.
    Normal,
    /// Random walk clamped to the nominal band.
    Noisy,
    /// Triangular wave, ±50 mC per tick.
    Ramp,
}

impl Mode {
    /// The exact token the text surface accepts and renders.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Noisy => "noisy",
            Self::Ramp => "ramp",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    /// Case-sensitive token match. A single trailing newline is stripped
    /// (text surfaces usually deliver one); anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Error> {
        let token = s.strip_suffix('\n').unwrap_or(s);
        match token {
            "normal" => Ok(Self::Normal),
            "noisy" => Ok(Self::Noisy),
            "ramp" => Ok(Self::Ramp),
            _ => Err(Error::Invalid("mode must be normal, noisy or ramp")),
        }
    }
}

// ---------------------------------------------------------------------------
// Ramp direction
// ---------------------------------------------------------------------------

/// Direction of the Ramp waveform. Only meaningful in [`Mode::Ramp`];
/// carried across mode switches so a ramp resumes where it left off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDir {
    Up,
    Down,
}

impl RampDir {
    const fn step_mc(self) -> i32 {
        match self {
            Self::Up => RAMP_STEP_MC,
            Self::Down => -RAMP_STEP_MC,
        }
    }
}

// ---------------------------------------------------------------------------
// Noise source
// ---------------------------------------------------------------------------

/// Deterministic xorshift32 noise source for [`Mode::Noisy`].
///
/// Seeded from host entropy by default; tests inject a fixed seed to make
/// the noisy waveform reproducible.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    state: u32,
}

impl NoiseSource {
    /// Seed from the host's hash randomization (non-cryptographic; the
    /// waveform only has to look noisy, not be unpredictable).
    pub fn from_entropy() -> Self {
        use std::collections::hash_map::RandomState;
        use std::hash::{BuildHasher, Hasher};

        let seed = RandomState::new().build_hasher().finish() as u32;
        Self::with_seed(seed)
    }

    /// Fixed seed; zero is remapped (xorshift has a fixed point at 0).
    pub fn with_seed(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xA5A5_A5A5 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform offset in [-NOISY_SPAN_MC, +NOISY_SPAN_MC].
    fn next_offset_mc(&mut self) -> i32 {
        let span = 2 * NOISY_SPAN_MC + 1;
        (self.next_u32() % span as u32) as i32 - NOISY_SPAN_MC
    }
}

// ---------------------------------------------------------------------------
// Step function
// ---------------------------------------------------------------------------

/// Advance the reading by one tick in the given mode.
///
/// Returns the new reading and the (possibly flipped) ramp direction.
/// The ramp direction is passed through untouched by Normal and Noisy.
pub fn advance(
    mode: Mode,
    temp_mc: i32,
    ramp: RampDir,
    noise: &mut NoiseSource,
) -> (i32, RampDir) {
    match mode {
        Mode::Normal => {
            let next = temp_mc + NORMAL_STEP_MC;
            if next > NORMAL_PEAK_MC {
                (BASE_TEMP_MC, ramp)
            } else {
                (next, ramp)
            }
        }
        Mode::Noisy => {
            let next = (temp_mc + noise.next_offset_mc()).clamp(NOISY_MIN_MC, NOISY_MAX_MC);
            (next, ramp)
        }
        Mode::Ramp => {
            let next = temp_mc + ramp.step_mc();
            let dir = if next >= RAMP_MAX_MC {
                RampDir::Down
            } else if next <= RAMP_MIN_MC {
                RampDir::Up
            } else {
                ramp
            };
            (next, dir)
        }
    }
}
