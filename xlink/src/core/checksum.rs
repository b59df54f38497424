//! XOR block check (BCC) for frame integrity verification.
//!
//! Two block checks protect every frame:
//! - the header check, `address ^ control`, carried in every frame;
//! - the payload check, the XOR of all payload bytes, appended to the
//!   payload of information frames before stuffing.
//!
//! # Example
//!
//! ```rust
//! use xlink::Bcc;
//!
//! let data = b"Hello, World!";
//! let check = Bcc::compute(data);
//!
//! // Verify block check
//! assert!(Bcc::verify(data, check));
//! ```

/// XOR block check calculator.
///
/// Mirrors the incremental `update`/`finalize` shape of a CRC so payloads
/// can be checked in pieces.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bcc {
    /// Running XOR of every byte seen.
    state: u8,
}

impl Bcc {
    /// Creates a new calculator with an empty state.
    #[inline]
    pub const fn new() -> Self {
        Self { state: 0 }
    }

    /// Folds the given bytes into the check.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.state ^= byte;
        }
    }

    /// Returns the block check.
    #[inline]
    pub const fn finalize(self) -> u8 {
        self.state
    }

    /// Computes the block check of the given data in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u8 {
        let mut bcc = Self::new();
        bcc.update(data);
        bcc.finalize()
    }

    /// Verifies that the data matches the expected block check.
    #[inline]
    pub fn verify(data: &[u8], expected: u8) -> bool {
        Self::compute(data) == expected
    }

    /// Header block check of a frame.
    #[inline]
    pub const fn header(address: u8, control: u8) -> u8 {
        address ^ control
    }
}
