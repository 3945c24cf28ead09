//! Per-consumer sessions: blocking reads, readiness probes, interruption.
//!
//! A session is a cursor over the engine's sample stream — the last
//! sequence number and alert polarity this consumer observed. Reads block
//! until the stream moves past the cursor, deliver exactly one record, and
//! only advance the cursor once delivery succeeded, so a transient consumer
//! mishap never silently drops a sample.
//!
//! Sessions are independent: each one sees every new sample exactly once
//! and does its own edge accounting against its own last-observed polarity.
//! A single global edge register would miscount as soon as a second
//! consumer appears.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::sample::{SampleRecord, FLAG_NEW_SAMPLE, FLAG_THRESHOLD_CROSSED};

use super::ports::SampleSink;
use super::Shared;

// ───────────────────────────────────────────────────────────────
// Readiness
// ───────────────────────────────────────────────────────────────

/// Result of a non-blocking readiness probe. Two independent bits; both,
/// either or neither may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness(u8);

impl Readiness {
    /// A sample newer than the session cursor exists.
    pub const READABLE: u8 = 0x1;
    /// Alert polarity differs from what this session last observed.
    pub const PRIORITY: u8 = 0x2;

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn readable(self) -> bool {
        self.0 & Self::READABLE != 0
    }

    pub const fn priority(self) -> bool {
        self.0 & Self::PRIORITY != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// ───────────────────────────────────────────────────────────────
// Interrupter
// ───────────────────────────────────────────────────────────────

/// Cancellation handle for a session's blocking read.
///
/// Signal-like semantics: `interrupt` sets a pending flag and wakes the
/// waiters; the session's current (or next) wait consumes the flag and
/// returns INTERRUPTED without touching the cursor or `last_error`.
#[derive(Clone)]
pub struct Interrupter {
    flag: Arc<AtomicBool>,
    shared: Arc<Shared>,
}

impl Interrupter {
    /// Cancel the session's blocking wait.
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Release);
        self.shared.notify_all();
    }
}

// ───────────────────────────────────────────────────────────────
// Session
// ───────────────────────────────────────────────────────────────

/// Snapshot taken under the engine mutex; committed to the cursor only
/// after successful delivery.
struct Materialized {
    record: SampleRecord,
    seq: u32,
    alert: bool,
}

/// One consumer's view of the sample stream.
pub struct Session {
    shared: Arc<Shared>,
    last_seq: u32,
    last_alert: bool,
    intr: Arc<AtomicBool>,
}

impl Session {
    /// Attach to the engine. The cursor starts at the current sequence and
    /// polarity, so the first read waits for the next tick instead of
    /// returning a stale sample.
    pub(crate) fn attach(shared: Arc<Shared>) -> Self {
        let (last_seq, last_alert) = {
            let state = shared.lock();
            (
                state.sample_seq,
                state.temp_mc >= state.config.threshold_mc,
            )
        };
        debug!("session opened at seq={last_seq}");
        Self {
            shared,
            last_seq,
            last_alert,
            intr: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancellation handle; clonable and usable from any thread.
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            flag: Arc::clone(&self.intr),
            shared: Arc::clone(&self.shared),
        }
    }

    // ── Blocking read ─────────────────────────────────────────

    /// Block until a sample newer than the cursor exists, then copy one
    /// encoded record into `buf`. Returns the record size.
    ///
    /// Fails with BUFFER_TOO_SMALL (recorded in `last_error`, cursor
    /// unchanged) if `buf` is shorter than [`SampleRecord::SIZE`], with
    /// INTERRUPTED if the wait was cancelled, with SHUTDOWN if the engine
    /// stopped.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let snap = self.acquire()?;
        if buf.len() < SampleRecord::SIZE {
            self.shared.note_error(ErrorKind::BufferTooSmall);
            return Err(Error::BufferTooSmall {
                need: SampleRecord::SIZE,
                got: buf.len(),
            });
        }
        buf[..SampleRecord::SIZE].copy_from_slice(&snap.record.to_bytes());
        self.commit(&snap);
        Ok(SampleRecord::SIZE)
    }

    /// Like [`read`](Session::read), but delivers through a transport.
    ///
    /// A sink failure surfaces as TRANSPORT (recorded in `last_error`) and
    /// leaves the cursor unchanged, so the sample is redelivered on the
    /// next call rather than silently dropped.
    pub fn read_with(&mut self, sink: &mut dyn SampleSink) -> Result<()> {
        let snap = self.acquire()?;
        if sink.deliver(&snap.record.to_bytes()).is_err() {
            self.shared.note_error(ErrorKind::Transport);
            return Err(Error::Transport);
        }
        self.commit(&snap);
        Ok(())
    }

    /// Blocking read returning the decoded record (in-process consumers).
    pub fn read_record(&mut self) -> Result<SampleRecord> {
        let snap = self.acquire()?;
        self.commit(&snap);
        Ok(snap.record)
    }

    // ── Readiness ─────────────────────────────────────────────

    /// Non-blocking probe: is a new sample waiting, and has the alert
    /// polarity flipped since this session last looked? Mutates nothing.
    ///
    /// The wakeup broadcast reaches every waiter, so a caller combining
    /// `poll` with a bounded host wait observes the next tick without any
    /// separate registration step.
    pub fn poll(&self) -> Readiness {
        let state = self.shared.lock();
        let mut bits = 0;
        if state.sample_seq != self.last_seq {
            bits |= Readiness::READABLE;
        }
        if (state.temp_mc >= state.config.threshold_mc) != self.last_alert {
            bits |= Readiness::PRIORITY;
        }
        Readiness(bits)
    }

    // ── Internal ──────────────────────────────────────────────

    /// Wait for the stream to move past the cursor, then snapshot the
    /// sample and account polarity edges — all under the engine mutex.
    fn acquire(&mut self) -> Result<Materialized> {
        let prev_seq = self.last_seq;
        let mut state = self.shared.lock();
        loop {
            if !state.running {
                return Err(Error::Shutdown);
            }
            if state.sample_seq != prev_seq {
                break;
            }
            // About to suspend: honor a pending cancellation first.
            if self.intr.swap(false, Ordering::AcqRel) {
                return Err(Error::Interrupted);
            }
            state = self.shared.wait(state);
        }

        let alert = state.temp_mc >= state.config.threshold_mc;
        if alert != self.last_alert {
            state.alerts += 1;
        }

        let mut flags = FLAG_NEW_SAMPLE;
        if alert {
            flags |= FLAG_THRESHOLD_CROSSED;
        }
        Ok(Materialized {
            record: SampleRecord {
                timestamp_ns: self.shared.clock().monotonic_ns(),
                temp_mc: state.temp_mc,
                flags,
            },
            seq: state.sample_seq,
            alert,
        })
    }

    /// Commit point: only successful delivery advances the cursor.
    fn commit(&mut self, snap: &Materialized) {
        self.last_seq = snap.seq;
        self.last_alert = snap.alert;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("session closed at seq={}", self.last_seq);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
