//! Thread-backed periodic ticker.
//!
//! Runs the tick callback on a dedicated named thread. The inter-tick
//! sleep is a condvar wait with timeout, so `stop` interrupts it
//! immediately instead of waiting out the period — important when the
//! period has just been reconfigured to several seconds.
//!
//! The callback's return value is the re-arm contract: `Some(delay)`
//! schedules the next tick, `None` disarms. Live period changes therefore
//! need no ticker-side API at all.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::debug;

use crate::engine::ports::{TickFn, Ticker};
use crate::error::{Error, Result};

struct TickerShared {
    stop: Mutex<bool>,
    wake: Condvar,
}

/// [`Ticker`] implementation on a dedicated `simtemp-tick` thread.
pub struct ThreadTicker {
    shared: Arc<TickerShared>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadTicker {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(TickerShared {
                stop: Mutex::new(false),
                wake: Condvar::new(),
            }),
            handle: None,
        }
    }
}

impl Default for ThreadTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker for ThreadTicker {
    fn start(&mut self, first: Duration, mut tick: TickFn) -> Result<()> {
        *lock_stop(&self.shared) = false;

        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name("simtemp-tick".into())
            .spawn(move || {
                let mut delay = first;
                loop {
                    let guard = lock_stop(&shared);
                    let (guard, _timeout) = shared
                        .wake
                        .wait_timeout_while(guard, delay, |stopped| !*stopped)
                        .unwrap_or_else(PoisonError::into_inner);
                    if *guard {
                        break;
                    }
                    drop(guard);

                    match tick() {
                        Some(next) => delay = next,
                        None => break,
                    }
                }
                debug!("tick thread exiting");
            })
            .map_err(|_| Error::NoMemory)?;

        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        *lock_stop(&self.shared) = true;
        self.shared.wake.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_stop(shared: &TickerShared) -> std::sync::MutexGuard<'_, bool> {
    shared.stop.lock().unwrap_or_else(PoisonError::into_inner)
}
