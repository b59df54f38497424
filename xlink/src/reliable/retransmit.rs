//! Retransmission control for reliable delivery.
//!
//! This module counts transmission attempts against the retry ceiling,
//! arms the per-attempt deadline, and keeps link statistics.

use super::clock::Clock;

/// Statistics about link behavior.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    /// Total frames written, retransmissions and acknowledgments included.
    pub frames_sent: u64,

    /// Information or handshake frames sent again.
    pub retransmissions: u64,

    /// Attempts that ended without a valid answer.
    pub timeouts: u64,

    /// REJ frames received by the sender.
    pub rejects_received: u64,

    /// REJ frames emitted by the receiver.
    pub rejects_sent: u64,

    /// Duplicate information frames filtered by the receiver.
    pub duplicates: u64,

    /// Information frames acknowledged by the peer.
    pub frames_acknowledged: u64,

    /// Information frames handed to the caller.
    pub frames_delivered: u64,

    /// Payload bytes acknowledged by the peer.
    pub bytes_sent: u64,

    /// Payload bytes handed to the caller.
    pub bytes_received: u64,
}

impl LinkStats {
    /// Creates new empty statistics.
    pub const fn new() -> Self {
        Self {
            frames_sent: 0,
            retransmissions: 0,
            timeouts: 0,
            rejects_received: 0,
            rejects_sent: 0,
            duplicates: 0,
            frames_acknowledged: 0,
            frames_delivered: 0,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    /// Returns the retransmission rate as a percentage of frames sent.
    pub fn retransmit_rate(&self) -> f32 {
        if self.frames_sent == 0 {
            0.0
        } else {
            (self.retransmissions as f32 / self.frames_sent as f32) * 100.0
        }
    }

    /// Resets all statistics.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Point in time after which the current attempt is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: u64,
}

impl Deadline {
    /// Arms a deadline `timeout_ms` from now.
    pub fn after<K: Clock>(clock: &mut K, timeout_ms: u64) -> Self {
        Self {
            expires_at: clock.now_ms().saturating_add(timeout_ms),
        }
    }

    /// Returns true once the clock has reached the deadline.
    pub fn is_expired<K: Clock>(&self, clock: &mut K) -> bool {
        clock.now_ms() >= self.expires_at
    }

    /// Returns the expiry timestamp in milliseconds.
    pub const fn expires_at(&self) -> u64 {
        self.expires_at
    }
}

/// Attempt counter with a fixed per-attempt timeout.
///
/// One timer serves one frame: SET, one information frame, or DISC.
#[derive(Debug, Clone, Copy)]
pub struct RetryTimer {
    /// Maximum transmissions of the frame.
    max_attempts: u8,

    /// Transmissions started so far.
    attempts: u8,

    /// Deadline length for each attempt.
    timeout_ms: u64,
}

impl RetryTimer {
    /// Creates a timer allowing `max_attempts` transmissions.
    pub const fn new(max_attempts: u8, timeout_ms: u64) -> Self {
        Self {
            max_attempts,
            attempts: 0,
            timeout_ms,
        }
    }

    /// Claims the next attempt. Returns false when the ceiling is reached.
    pub fn start_attempt(&mut self) -> bool {
        if self.attempts >= self.max_attempts {
            return false;
        }
        self.attempts += 1;
        true
    }

    /// Arms the deadline of the current attempt.
    pub fn arm<K: Clock>(&self, clock: &mut K) -> Deadline {
        Deadline::after(clock, self.timeout_ms)
    }

    /// Returns the number of attempts started.
    pub const fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Returns the retry ceiling.
    pub const fn max_attempts(&self) -> u8 {
        self.max_attempts
    }

    /// Returns true if the current attempt is a retransmission.
    pub const fn is_retransmission(&self) -> bool {
        self.attempts > 1
    }

    /// Returns the per-attempt timeout.
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Resets the attempt counter.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reliable::StepClock;

    #[test]
    fn test_attempt_ceiling() {
        let mut timer = RetryTimer::new(3, 100);

        assert!(timer.start_attempt());
        assert!(!timer.is_retransmission());
        assert!(timer.start_attempt());
        assert!(timer.is_retransmission());
        assert!(timer.start_attempt());
        assert!(!timer.start_attempt());
        assert_eq!(timer.attempts(), 3);

        timer.reset();
        assert_eq!(timer.attempts(), 0);
        assert!(timer.start_attempt());
    }

    #[test]
    fn test_deadline_expiry() {
        let mut clock = StepClock::new(10);
        let timer = RetryTimer::new(1, 50);

        // Arming reads the clock once (t = 10)
        let deadline = timer.arm(&mut clock);
        assert_eq!(deadline.expires_at(), 60);

        let mut polls = 0;
        while !deadline.is_expired(&mut clock) {
            polls += 1;
        }
        assert_eq!(polls, 4);
    }

    #[test]
    fn test_retransmit_rate() {
        let mut stats = LinkStats::new();
        assert_eq!(stats.retransmit_rate(), 0.0);

        stats.frames_sent = 4;
        stats.retransmissions = 1;
        assert_eq!(stats.retransmit_rate(), 25.0);

        stats.reset();
        assert_eq!(stats, LinkStats::default());
    }
}
