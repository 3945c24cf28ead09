//! simtemp — simulated temperature sensor sampling engine.
//!
//! A timer-driven producer generates milli-degree Celsius readings in one
//! of three waveforms; any number of consumers read the stream through
//! independent blocking sessions with edge-triggered threshold detection.
//! Period, threshold and mode are reconfigurable at runtime without
//! stopping the cadence.
//!
//! The crate is the engine only: host glue (character device, sysfs tree,
//! CLI) lives outside and talks to the engine through its public API and
//! the port traits in [`engine::ports`].
//!
//! ```no_run
//! use simtemp::engine::Engine;
//! use simtemp::sample::SampleRecord;
//!
//! # fn main() -> simtemp::error::Result<()> {
//! let mut engine = Engine::new()?;
//! engine.start()?;
//!
//! let mut session = engine.open();
//! let mut buf = [0u8; SampleRecord::SIZE];
//! session.read(&mut buf)?; // blocks until the next tick
//! let sample = SampleRecord::from_bytes(&buf);
//! println!("temp = {} mC", sample.temp_mc);
//!
//! engine.stop();
//! # Ok(())
//! # }
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod attrs;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod sample;
