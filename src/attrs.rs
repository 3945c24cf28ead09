//! Text attribute surface — the key/value face a host exposes to operators.
//!
//! The host (a sysfs-like tree, a debug shell, an RPC handler) names four
//! items and transports their text; parsing, validation and rendering live
//! here so every transport behaves identically:
//!
//! | name           | access | value                         |
//! |----------------|--------|-------------------------------|
//! | `sampling_ms`  | RW     | decimal integer, 1..=10000    |
//! | `threshold_mC` | RW     | decimal integer, -20000..=60000 |
//! | `mode`         | RW     | `normal` \| `noisy` \| `ramp` |
//! | `stats`        | RO     | three-line counter block      |
//!
//! `show` output is newline-terminated; `store` tolerates one trailing
//! newline (echo-into-a-file convention). Unparseable or out-of-range
//! writes are rejected INVALID and recorded in `stats.last_error`; a write
//! to `stats` is rejected without being recorded, the way a read-only file
//! fails before reaching the driver.

use core::str::FromStr;

use crate::engine::Engine;
use crate::error::{Error, ErrorKind, Result};

/// The named attributes of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    SamplingMs,
    ThresholdMc,
    Mode,
    Stats,
}

impl Attr {
    /// Every attribute, in the order a host would list them.
    pub const ALL: [Attr; 4] = [Attr::SamplingMs, Attr::ThresholdMc, Attr::Mode, Attr::Stats];

    /// The exact name the host exposes.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SamplingMs => "sampling_ms",
            Self::ThresholdMc => "threshold_mC",
            Self::Mode => "mode",
            Self::Stats => "stats",
        }
    }

    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::Stats)
    }

    /// Resolve an attribute by its exposed name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }
}

/// Render the current value of an attribute, newline-terminated.
pub fn show(engine: &Engine, attr: Attr) -> String {
    match attr {
        Attr::SamplingMs => format!("{}\n", engine.sampling_ms()),
        Attr::ThresholdMc => format!("{}\n", engine.threshold_mc()),
        Attr::Mode => format!("{}\n", engine.mode()),
        Attr::Stats => engine.stats().to_string(),
    }
}

/// Parse and apply a write to an attribute.
pub fn store(engine: &Engine, attr: Attr, input: &str) -> Result<()> {
    match attr {
        Attr::SamplingMs => {
            let value = parse_decimal::<u32>(engine, input, "sampling_ms must be a decimal integer")?;
            engine.set_sampling_ms(value)
        }
        Attr::ThresholdMc => {
            let value =
                parse_decimal::<i32>(engine, input, "threshold_mC must be a decimal integer")?;
            engine.set_threshold_mc(value)
        }
        Attr::Mode => engine.set_mode_token(input),
        Attr::Stats => Err(Error::Invalid("stats is read-only")),
    }
}

/// Strict decimal parse: one trailing newline tolerated, nothing else.
/// Failures are recorded as INVALID before surfacing.
fn parse_decimal<T: FromStr>(engine: &Engine, input: &str, rule: &'static str) -> Result<T> {
    let token = input.strip_suffix('\n').unwrap_or(input);
    token.parse::<T>().map_err(|_| {
        engine.note_error(ErrorKind::Invalid);
        Error::Invalid(rule)
    })
}
