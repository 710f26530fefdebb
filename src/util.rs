//! Scope timing for mesh builds and simulation steps.

use std::time::Instant;

/// Guard that logs how long a scope took when it is dropped.
///
/// ```ignore
/// let _t = Timed::info("Geodesic sphere");
/// // ... build ...
/// // logs "Geodesic sphere: 12.3ms"
/// ```
pub struct Timed {
    name: &'static str,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Time a scope and report at `level`.
    pub fn at(level: log::Level, name: &'static str) -> Self {
        log::trace!("{} started", name);
        Self {
            name,
            start: Instant::now(),
            level,
        }
    }

    /// Report at INFO level (mesh builds and other one-off work).
    pub fn info(name: &'static str) -> Self {
        Self::at(log::Level::Info, name)
    }

    /// Report at DEBUG level (per-step work).
    pub fn debug(name: &'static str) -> Self {
        Self::at(log::Level::Debug, name)
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}
