//! Time sources for deadlines.
//!
//! Deadlines are checked on every channel poll, so a clock is read often
//! and must be cheap.

/// Monotonic millisecond time source.
pub trait Clock {
    /// Returns the current time in milliseconds.
    fn now_ms(&mut self) -> u64;
}

impl<K: Clock + ?Sized> Clock for &mut K {
    fn now_ms(&mut self) -> u64 {
        (**self).now_ms()
    }
}

/// Wall clock backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Creates a clock whose zero is now.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&mut self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Simulated clock that moves forward a fixed step on every reading.
///
/// Makes timeout paths deterministic: an attempt with timeout `t` ends
/// after about `t / step` channel polls.
#[derive(Debug, Clone, Copy)]
pub struct StepClock {
    now: u64,
    step: u64,
}

impl StepClock {
    /// Creates a clock at zero advancing `step_ms` per reading.
    pub const fn new(step_ms: u64) -> Self {
        Self {
            now: 0,
            step: step_ms,
        }
    }

    /// Returns the current time without advancing.
    pub const fn peek(&self) -> u64 {
        self.now
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
    }
}

impl Clock for StepClock {
    fn now_ms(&mut self) -> u64 {
        self.now = self.now.saturating_add(self.step);
        self.now
    }
}
