//! Unified error types for the simtemp engine.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! engine surface and its host shims uniform. Each variant carries a stable
//! negative code (errno-flavored) so a character-device host can hand the
//! value straight back to its caller, and so the `stats` surface can report
//! the most recent failure as a plain integer.

use core::fmt;

// ---------------------------------------------------------------------------
// Error kinds and codes
// ---------------------------------------------------------------------------

/// Discriminant of every failure the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration value out of range, unrecognized token, or lifecycle
    /// misuse (e.g. starting a running engine).
    Invalid,
    /// Consumer buffer smaller than one sample record.
    BufferTooSmall,
    /// Delivery to the consumer failed mid-copy.
    Transport,
    /// Blocking wait cancelled before a new sample arrived.
    Interrupted,
    /// Engine stopped while the caller was waiting.
    Shutdown,
    /// Resource exhaustion (session allocation, ticker thread spawn).
    NoMemory,
}

impl ErrorKind {
    /// Stable negative code, errno-flavored: EINVAL, EMSGSIZE, EFAULT,
    /// EINTR, ESHUTDOWN, ENOMEM.
    pub const fn code(self) -> i32 {
        match self {
            Self::Invalid => -22,
            Self::BufferTooSmall => -90,
            Self::Transport => -14,
            Self::Interrupted => -4,
            Self::Shutdown => -108,
            Self::NoMemory => -12,
        }
    }

    /// Whether a failure of this kind is recorded in `stats.last_error`.
    /// Interruption and shutdown are normal lifecycle conditions for
    /// blocked callers, not faults.
    pub const fn is_recorded(self) -> bool {
        !matches!(self, Self::Interrupted | Self::Shutdown)
    }
}

// ---------------------------------------------------------------------------
// Error value
// ---------------------------------------------------------------------------

/// Every fallible engine operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Rejected value or token. The `&'static str` names the field and rule.
    Invalid(&'static str),
    /// Consumer buffer too small: `need` bytes required, `got` supplied.
    BufferTooSmall { need: usize, got: usize },
    /// Sample delivery failed.
    Transport,
    /// Wait interrupted.
    Interrupted,
    /// Engine stopped.
    Shutdown,
    /// Allocation or spawn failure.
    NoMemory,
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Self::Transport => ErrorKind::Transport,
            Self::Interrupted => ErrorKind::Interrupted,
            Self::Shutdown => ErrorKind::Shutdown,
            Self::NoMemory => ErrorKind::NoMemory,
        }
    }

    /// Negative code of this error (see [`ErrorKind::code`]).
    pub const fn code(&self) -> i32 {
        self.kind().code()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "invalid: {msg}"),
            Self::BufferTooSmall { need, got } => {
                write!(f, "buffer too small: need {need} bytes, got {got}")
            }
            Self::Transport => write!(f, "sample delivery failed"),
            Self::Interrupted => write!(f, "wait interrupted"),
            Self::Shutdown => write!(f, "engine stopped"),
            Self::NoMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for Error {}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
