//! Mock adapters for integration tests.
//!
//! `ManualTicker` captures the engine's tick callback and fires it on
//! demand, recording every re-arm delay so tests can observe live period
//! changes. `MockClock` is advanced by hand. `RecordingSink` keeps every
//! delivered record and can be told to fail to exercise the transport
//! error path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use simtemp::engine::ports::{Clock, SampleSink, TickFn, Ticker};
use simtemp::engine::{Engine, EngineBuilder};
use simtemp::error::{Error, Result};
use simtemp::sample::SampleRecord;

// ── ManualTicker ──────────────────────────────────────────────

#[derive(Default)]
struct ManualCore {
    tick: Option<TickFn>,
    delays: Vec<Duration>,
    first: Option<Duration>,
}

/// Test ticker: the engine arms it, tests fire it.
#[derive(Clone, Default)]
pub struct ManualTicker {
    core: Arc<Mutex<ManualCore>>,
}

#[allow(dead_code)]
impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire one tick. Returns false once the engine has disarmed.
    pub fn fire(&self) -> bool {
        let mut core = self.core.lock().unwrap();
        let Some(tick) = core.tick.as_mut() else {
            return false;
        };
        match tick() {
            Some(next) => {
                core.delays.push(next);
                true
            }
            None => {
                core.tick = None;
                false
            }
        }
    }

    /// Every re-arm delay the engine requested, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.core.lock().unwrap().delays.clone()
    }

    /// The initial arm delay passed to `start`.
    pub fn first_delay(&self) -> Option<Duration> {
        self.core.lock().unwrap().first
    }

    pub fn is_armed(&self) -> bool {
        self.core.lock().unwrap().tick.is_some()
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, first: Duration, tick: TickFn) -> Result<()> {
        let mut core = self.core.lock().unwrap();
        core.first = Some(first);
        core.tick = Some(tick);
        Ok(())
    }

    fn stop(&mut self) {
        self.core.lock().unwrap().tick = None;
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Manually advanced monotonic clock.
#[derive(Default)]
pub struct MockClock {
    ns: AtomicU64,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: u64) {
        self.ns.fetch_add(ms * 1_000_000, Ordering::Relaxed);
    }
}

impl Clock for MockClock {
    fn monotonic_ns(&self) -> u64 {
        self.ns.load(Ordering::Relaxed)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Sample sink that records deliveries and can be made to fail.
#[derive(Default)]
pub struct RecordingSink {
    pub fail: bool,
    pub delivered: Vec<SampleRecord>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleSink for RecordingSink {
    fn deliver(&mut self, record: &[u8; SampleRecord::SIZE]) -> Result<()> {
        if self.fail {
            return Err(Error::Transport);
        }
        self.delivered.push(SampleRecord::from_bytes(record));
        Ok(())
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A started-by-hand engine wired to mock adapters.
#[allow(dead_code)]
pub fn make_engine() -> (Engine, ManualTicker, Arc<MockClock>) {
    let ticker = ManualTicker::new();
    let clock = Arc::new(MockClock::new());
    let engine = EngineBuilder::new()
        .clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .ticker(Box::new(ticker.clone()))
        .noise_seed(0x5EED)
        .build()
        .expect("default config is valid");
    (engine, ticker, clock)
}
