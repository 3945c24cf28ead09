//! Port traits — the hexagonal boundary between the engine and its host.
//!
//! ```text
//!   Ticker ──▶ Engine tick          (driven: scheduler → domain)
//!   Engine ──▶ Clock                (driven: domain → time source)
//!   Engine ──▶ SampleSink           (driven: domain → consumer transport)
//! ```
//!
//! Adapters implement these traits; the engine consumes them via trait
//! objects injected at construction. The engine itself never touches a
//! thread, a timer facility, or a transport directly, so the whole core
//! runs deterministically against mock adapters.

use std::time::Duration;

use crate::error::Result;
use crate::sample::SampleRecord;

/// Monotonic time source, nanosecond resolution.
///
/// Only ever queried, never slept on; the sampling cadence comes from the
/// [`Ticker`], not from the clock.
pub trait Clock: Send + Sync {
    /// Nanoseconds since an arbitrary fixed origin. Must never go backwards.
    fn monotonic_ns(&self) -> u64;
}

/// Callback invoked on every tick.
///
/// Returns the delay until the next tick, or `None` to disarm — the engine
/// uses this to apply live period changes and to stop the cadence on
/// shutdown without the ticker knowing either concept.
pub type TickFn = Box<dyn FnMut() -> Option<Duration> + Send>;

/// Periodic scheduler abstraction (arm, cancel, tick callback).
///
/// Implementations must invoke `tick` once per armed delay, re-arming with
/// whatever delay the callback returns. `stop` cancels any pending tick and
/// must not return while a tick invocation is still in flight.
pub trait Ticker: Send {
    /// Arm the first tick after `first`, then follow the callback's re-arm
    /// contract. Fails with NO_MEMORY if the backing resource (e.g. a
    /// thread) cannot be created.
    fn start(&mut self, first: Duration, tick: TickFn) -> Result<()>;

    /// Cancel the cadence. Idempotent.
    fn stop(&mut self);
}

/// Consumer-side delivery target for one encoded sample record.
///
/// Models the copy-to-consumer step of a host transport (e.g. a character
/// device's copy to user space). A failed delivery surfaces to the reader
/// as TRANSPORT and leaves the session cursor unchanged, so the sample is
/// not silently dropped.
pub trait SampleSink {
    /// Accept one whole record. Any error is treated as a mid-copy failure.
    fn deliver(&mut self, record: &[u8; SampleRecord::SIZE]) -> Result<()>;
}
