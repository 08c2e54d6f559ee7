//! Process-wide log severity gate.
//!
//! Engine code logs through `tracing`; the subscriber installed by
//! [`crate::telemetry::init_default_tracing`] consults [`allows`] so the
//! severity chosen at runtime (for example through the C ABI) applies to
//! every event.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::Level;

/// Minimum severity that is emitted; `None` silences everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Severity {
    Debug = 1,
    Warn = 2,
    Error = 3,
    None = 0,
}

impl Severity {
    /// Maps the C constants (`0` none, `1` debug, `2` warn, `3` error);
    /// unknown values silence logging.
    #[must_use]
    pub fn from_level(level: i32) -> Self {
        match level {
            1 => Self::Debug,
            2 => Self::Warn,
            3 => Self::Error,
            _ => Self::None,
        }
    }

    /// Most verbose `tracing` level let through, or `None` when silenced.
    #[must_use]
    pub fn max_level(self) -> Option<Level> {
        match self {
            Self::Debug => Some(Level::TRACE),
            Self::Warn => Some(Level::WARN),
            Self::Error => Some(Level::ERROR),
            Self::None => None,
        }
    }

    fn from_u8(raw: u8) -> Self {
        Self::from_level(i32::from(raw))
    }
}

static SEVERITY: AtomicU8 = AtomicU8::new(Severity::Warn as u8);

pub fn set_severity(severity: Severity) {
    SEVERITY.store(severity as u8, Ordering::Relaxed);
}

#[must_use]
pub fn severity() -> Severity {
    Severity::from_u8(SEVERITY.load(Ordering::Relaxed))
}

/// True when an event at `level` passes the current severity.
#[must_use]
pub fn allows(level: &Level) -> bool {
    severity().max_level().is_some_and(|max| *level <= max)
}

#[cfg(test)]
mod tests {
    use super::Severity;
    use tracing::Level;

    #[test]
    fn unknown_levels_silence_logging() {
        assert_eq!(Severity::from_level(7), Severity::None);
        assert_eq!(Severity::from_level(-1).max_level(), None);
    }

    #[test]
    fn warn_lets_errors_through_but_not_info() {
        let max = Severity::Warn.max_level().expect("warn has a level");
        assert!(Level::ERROR <= max);
        assert!(Level::WARN <= max);
        assert!(Level::INFO > max);
    }
}
