//! Reliable transport mechanisms.
//!
//! This module provides reliability features:
//! - Clock: Injectable time sources for deadlines
//! - RetryTimer: Per-attempt deadlines under a shared retry ceiling

mod clock;
mod retransmit;

pub use clock::{Clock, StepClock};
pub use retransmit::{Deadline, LinkStats, RetryTimer};

#[cfg(feature = "std")]
pub use clock::SystemClock;
