//! Sampling engine — the hexagonal core.
//!
//! [`Engine`] owns the simulated sensor state and its lifecycle. A
//! [`Ticker`] port drives the periodic update; [`Session`]s give each
//! consumer an independent, exactly-once view of the sample stream.
//!
//! ```text
//!   Ticker ──▶ ┌─────────────────────────────┐
//!              │           Engine            │──▶ wakeup broadcast
//!   setters ──▶│  reading · seq · counters   │
//!              └─────────────────────────────┘
//!                 ▲ snapshot          ▲ snapshot
//!            Session A           Session B   (blocking reads)
//! ```
//!
//! One mutex guards all mutable state; the condition variable is the
//! one-to-many wakeup. The tick mutates under the mutex, broadcasts after
//! releasing it, and re-arms with the *currently configured* period, so
//! `sampling_ms` changes apply from the next tick without a restart.

pub mod ports;
pub mod session;

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use crate::adapters::clock::SystemClock;
use crate::adapters::ticker::ThreadTicker;
use crate::config::{self, SimtempConfig};
use crate::error::{Error, ErrorKind, Result};
use crate::generator::{self, Mode, NoiseSource, RampDir, BASE_TEMP_MC};

use ports::{Clock, Ticker};
use session::Session;

// ───────────────────────────────────────────────────────────────
// Aggregate counters
// ───────────────────────────────────────────────────────────────

/// Counter snapshot exposed by the `stats` surface.
///
/// `alerts` counts polarity edges as observed by read sessions, so with
/// several consumers it is a liveness signal rather than an exact global
/// edge count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Total ticks that produced a sample.
    pub updates: u64,
    /// Total alert-polarity edges observed by read sessions.
    pub alerts: u64,
    /// Code of the most recent recorded failure, 0 when none.
    pub last_error: i32,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "updates={}", self.updates)?;
        writeln!(f, "alerts={}", self.alerts)?;
        writeln!(f, "last_error={}", self.last_error)
    }
}

// ───────────────────────────────────────────────────────────────
// Shared state
// ───────────────────────────────────────────────────────────────

/// Everything the mutex guards.
struct EngineState {
    /// Current simulated reading (mC).
    temp_mc: i32,
    /// Wrapping sample counter; equality-compare only, never order-compare.
    sample_seq: u32,
    config: SimtempConfig,
    ramp: RampDir,
    noise: NoiseSource,
    updates: u64,
    alerts: u64,
    last_error: i32,
    running: bool,
}

/// State + wakeup + clock, shared between the engine, the tick callback
/// and every open session.
pub(crate) struct Shared {
    state: Mutex<EngineState>,
    wakeup: Condvar,
    clock: Arc<dyn Clock>,
}

impl Shared {
    /// The engine never panics while holding the lock, so a poisoned mutex
    /// can only come from a panicking host callback; recover the guard and
    /// keep serving.
    pub(crate) fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait<'a>(
        &self,
        guard: MutexGuard<'a, EngineState>,
    ) -> MutexGuard<'a, EngineState> {
        self.wakeup
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn notify_all(&self) {
        self.wakeup.notify_all();
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Record a failure in `last_error`. Interruption and shutdown are
    /// filtered out by [`ErrorKind::is_recorded`].
    pub(crate) fn note_error(&self, kind: ErrorKind) {
        if kind.is_recorded() {
            self.lock().last_error = kind.code();
        }
    }

    /// One timer tick: step the generator, advance the counters, then
    /// broadcast and report the next re-arm delay. Returns `None` once the
    /// engine has stopped so the ticker disarms.
    fn tick(&self) -> Option<Duration> {
        let next_ms = {
            let mut guard = self.lock();
            if !guard.running {
                return None;
            }
            let state = &mut *guard;
            let (temp, ramp) = generator::advance(
                state.config.mode,
                state.temp_mc,
                state.ramp,
                &mut state.noise,
            );
            state.temp_mc = temp;
            state.ramp = ramp;
            state.updates += 1;
            state.sample_seq = state.sample_seq.wrapping_add(1);
            state.config.sampling_ms
        };
        // Broadcast happens-after the mutation it announces; every waiter
        // that re-acquires the mutex sees the advanced sequence.
        self.notify_all();
        Some(Duration::from_millis(u64::from(next_ms)))
    }
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// The sampling engine.
///
/// Create (validated), [`start`](Engine::start), reconfigure freely,
/// [`stop`](Engine::stop), drop. Consumers attach through
/// [`open`](Engine::open); sessions stay valid across reconfiguration and
/// observe SHUTDOWN once the engine stops.
pub struct Engine {
    shared: Arc<Shared>,
    ticker: Box<dyn Ticker>,
    started: bool,
}

impl Engine {
    /// Engine with default configuration, system clock and thread ticker.
    pub fn new() -> Result<Self> {
        Self::with_config(SimtempConfig::default())
    }

    /// Engine with the given configuration and default adapters.
    pub fn with_config(config: SimtempConfig) -> Result<Self> {
        EngineBuilder::new().config(config).build()
    }

    /// Start from a builder to inject adapters (tests, embedded hosts).
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Arm the ticker and begin producing samples.
    ///
    /// Rejected with INVALID if the engine is already running.
    pub fn start(&mut self) -> Result<()> {
        let first = {
            let mut state = self.shared.lock();
            if state.running {
                drop(state);
                let err = Error::Invalid("engine already started");
                self.shared.note_error(err.kind());
                return Err(err);
            }
            state.running = true;
            Duration::from_millis(u64::from(state.config.sampling_ms))
        };

        let shared = Arc::clone(&self.shared);
        if let Err(err) = self.ticker.start(first, Box::new(move || shared.tick())) {
            self.shared.lock().running = false;
            self.shared.note_error(err.kind());
            return Err(err);
        }

        self.started = true;
        info!(
            "engine started: sampling_ms={} threshold_mC={} mode={}",
            self.sampling_ms(),
            self.threshold_mc(),
            self.mode()
        );
        Ok(())
    }

    /// Stop the cadence and wake every blocked reader with SHUTDOWN.
    /// Idempotent.
    pub fn stop(&mut self) {
        let was_running = {
            let mut state = self.shared.lock();
            std::mem::replace(&mut state.running, false)
        };
        // Terminal wake: in-flight waiters re-check `running` and bail out.
        self.shared.notify_all();
        self.ticker.stop();
        if was_running {
            info!("engine stopped");
        }
    }

    /// Whether the engine is currently producing samples.
    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Create a fresh consumer session.
    ///
    /// The session cursor starts at the current sequence and polarity, so
    /// its first read waits for the next tick — a consumer never receives
    /// an already-present sample.
    pub fn open(&self) -> Session {
        Session::attach(Arc::clone(&self.shared))
    }

    // ── Configuration surface ─────────────────────────────────

    /// Set the sampling period. Takes effect at the next re-arm.
    pub fn set_sampling_ms(&self, value: u32) -> Result<()> {
        if let Err(err) = config::validate_sampling_ms(value) {
            warn!("rejected sampling_ms={value}");
            self.shared.note_error(err.kind());
            return Err(err);
        }
        self.shared.lock().config.sampling_ms = value;
        info!("sampling_ms set to {value}");
        Ok(())
    }

    pub fn sampling_ms(&self) -> u32 {
        self.shared.lock().config.sampling_ms
    }

    /// Set the alert threshold. Applies to the next polarity evaluation.
    pub fn set_threshold_mc(&self, value: i32) -> Result<()> {
        if let Err(err) = config::validate_threshold_mc(value) {
            warn!("rejected threshold_mC={value}");
            self.shared.note_error(err.kind());
            return Err(err);
        }
        self.shared.lock().config.threshold_mc = value;
        info!("threshold_mC set to {value}");
        Ok(())
    }

    pub fn threshold_mc(&self) -> i32 {
        self.shared.lock().config.threshold_mc
    }

    /// Switch the generator mode. The enum is validated by construction;
    /// the tick reads the tag directly.
    pub fn set_mode(&self, mode: Mode) {
        self.shared.lock().config.mode = mode;
        info!("mode set to {mode}");
    }

    /// Text-surface mode setter: exact token, one trailing newline
    /// tolerated. Unrecognized tokens are recorded as INVALID.
    pub fn set_mode_token(&self, token: &str) -> Result<()> {
        match token.parse::<Mode>() {
            Ok(mode) => {
                self.set_mode(mode);
                Ok(())
            }
            Err(err) => {
                warn!("rejected mode token {token:?}");
                self.shared.note_error(err.kind());
                Err(err)
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.shared.lock().config.mode
    }

    /// Snapshot of the live configuration.
    pub fn current_config(&self) -> SimtempConfig {
        self.shared.lock().config.clone()
    }

    // ── Diagnostics ───────────────────────────────────────────

    /// Counter snapshot.
    pub fn stats(&self) -> Stats {
        let state = self.shared.lock();
        Stats {
            updates: state.updates,
            alerts: state.alerts,
            last_error: state.last_error,
        }
    }

    /// Current reading (mC). Snapshot only; consumers should read through
    /// a [`Session`] to get exactly-once delivery and edge accounting.
    pub fn current_temp_mc(&self) -> i32 {
        self.shared.lock().temp_mc
    }

    /// Record a failure observed by a host shim (e.g. a transport error
    /// outside the read path) in `stats.last_error`.
    pub(crate) fn note_error(&self, kind: ErrorKind) {
        self.shared.note_error(kind);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.started {
            self.stop();
            debug!("engine dropped");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Builder
// ───────────────────────────────────────────────────────────────

/// Assembles an [`Engine`] from a configuration and port adapters.
///
/// Defaults: [`SimtempConfig::default`], [`SystemClock`], [`ThreadTicker`]
/// and an entropy-seeded noise source.
pub struct EngineBuilder {
    config: SimtempConfig,
    clock: Option<Arc<dyn Clock>>,
    ticker: Option<Box<dyn Ticker>>,
    noise_seed: Option<u32>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: SimtempConfig::default(),
            clock: None,
            ticker: None,
            noise_seed: None,
        }
    }

    pub fn config(mut self, config: SimtempConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject a time source (tests use a manually advanced clock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Inject a tick scheduler (tests fire ticks by hand).
    pub fn ticker(mut self, ticker: Box<dyn Ticker>) -> Self {
        self.ticker = Some(ticker);
        self
    }

    /// Fix the Noisy-mode seed for reproducible waveforms.
    pub fn noise_seed(mut self, seed: u32) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    /// Validate the configuration and assemble the engine.
    pub fn build(self) -> Result<Engine> {
        self.config.validate()?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>);
        let ticker = self
            .ticker
            .unwrap_or_else(|| Box::new(ThreadTicker::new()) as Box<dyn Ticker>);
        let noise = match self.noise_seed {
            Some(seed) => NoiseSource::with_seed(seed),
            None => NoiseSource::from_entropy(),
        };

        let shared = Arc::new(Shared {
            state: Mutex::new(EngineState {
                temp_mc: BASE_TEMP_MC,
                sample_seq: 0,
                config: self.config,
                ramp: RampDir::Up,
                noise,
                updates: 0,
                alerts: 0,
                last_error: 0,
                running: false,
            }),
            wakeup: Condvar::new(),
            clock,
        });

        Ok(Engine {
            shared,
            ticker,
            started: false,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
