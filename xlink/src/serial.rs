//! Serial port channel.
//!
//! Wraps a `serialport` device as a [`Channel`]. Reads wait at most the
//! configured poll interval; a read that times out reports `WouldBlock`
//! so the session can check its deadline.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use crate::channel::Channel;
use crate::config::LinkConfig;
use crate::error::{Error, Result};
use crate::protocol::Session;
use crate::reliable::SystemClock;

/// Default wait for a single byte before reporting `WouldBlock`.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Serial device implementing [`Channel`].
pub struct SerialChannel {
    port: Option<Box<dyn SerialPort>>,
    name: String,
}

impl SerialChannel {
    /// Opens `path` at `baud_rate` with the default poll interval.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_poll(path, baud_rate, DEFAULT_POLL_INTERVAL)
    }

    /// Opens `path` at `baud_rate`; reads wait at most `poll`.
    pub fn open_with_poll(path: &str, baud_rate: u32, poll: Duration) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(poll)
            .open()
            .map_err(|e| {
                log::error!("Failed to open {}: {}", path, e);
                Error::ChannelOpen
            })?;

        log::debug!("Opened {} at {} baud", path, baud_rate);
        Ok(Self {
            port: Some(port),
            name: path.to_string(),
        })
    }

    /// Device path this channel was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(Error::ChannelClosed)
    }
}

fn map_io(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
            Error::WouldBlock
        }
        _ => {
            log::error!("Serial I/O error: {}", e);
            Error::Io
        }
    }
}

impl Channel for SerialChannel {
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        match self.port()?.read(&mut byte) {
            Ok(0) => Err(Error::WouldBlock),
            Ok(_) => Ok(byte[0]),
            Err(e) => Err(map_io(e)),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.port()?.write(buf).map_err(map_io)
    }

    fn flush(&mut self) -> Result<()> {
        self.port()?.flush().map_err(map_io)
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            log::debug!("Closed {}", self.name);
        }
        Ok(())
    }
}

/// Opens the serial device and runs the handshake for `config.role`.
pub fn open(
    path: &str,
    baud_rate: u32,
    config: LinkConfig,
) -> Result<Session<SerialChannel, SystemClock>> {
    config.validate()?;
    let channel = SerialChannel::open(path, baud_rate)?;
    Session::open(channel, SystemClock::new(), config)
}
