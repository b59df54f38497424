//! Channel layer abstraction.
//!
//! This module provides the `Channel` trait that allows the link protocol
//! to run over any raw byte channel (serial port, pipe, socket, ...).
//!
//! # Implementations
//!
//! - `NullChannel`: Discards all data, never yields a byte (testing)
//! - `PipeChannel`: In-memory duplex pair for two endpoints (requires `std` feature)
//! - `SerialChannel`: Serial device (requires `serial` feature, see [`crate::serial`])
//!
//! # Example
//!
//! ```rust
//! use xlink::channel::{self, Channel};
//!
//! let (mut a, mut b) = channel::pipe();
//! a.write_all(b"Hi").unwrap();
//!
//! assert_eq!(b.read_byte().unwrap(), b'H');
//! assert_eq!(b.read_byte().unwrap(), b'i');
//! ```

use crate::error::{Error, Result};

#[cfg(feature = "std")]
mod pipe;

#[cfg(feature = "std")]
pub use pipe::{PipeChannel, pipe};

/// Raw byte channel consumed by the link layer.
///
/// `read_byte` must return promptly: the session checks its deadline
/// between polls, so a channel that blocks indefinitely stalls timeouts.
pub trait Channel {
    /// Reads the next byte.
    ///
    /// Returns `Error::WouldBlock` if no byte is available yet. Any other
    /// error is a permanent channel failure.
    fn read_byte(&mut self) -> Result<u8>;

    /// Writes bytes from the buffer.
    ///
    /// Returns the number of bytes written, or an error.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Flushes any buffered data.
    fn flush(&mut self) -> Result<()>;

    /// Releases the channel. Later reads and writes may fail.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Writes all bytes, retrying until complete, then flushes.
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            match self.write(&buf[written..]) {
                Ok(0) => return Err(Error::WriteZero),
                Ok(n) => written += n,
                Err(Error::WouldBlock) => continue,
                Err(e) => return Err(e),
            }
        }
        self.flush()
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// A null channel that discards all writes and never yields a byte.
///
/// A peer that never answers: useful for exercising timeouts.
#[derive(Debug, Default)]
pub struct NullChannel {
    bytes_written: usize,
    writes: usize,
    closed: bool,
}

impl NullChannel {
    /// Creates a new null channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of bytes written.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Returns the number of write calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Returns true once the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Channel for NullChannel {
    fn read_byte(&mut self) -> Result<u8> {
        if self.closed {
            return Err(Error::ChannelClosed);
        }
        Err(Error::WouldBlock)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::ChannelClosed);
        }
        self.bytes_written += buf.len();
        self.writes += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
