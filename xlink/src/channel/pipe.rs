//! In-memory duplex channel pair.
//!
//! Bytes written on one end come out of the other in order. Dropping or
//! closing an end makes the other end's reads fail with
//! `Error::ChannelClosed` once the buffered bytes are drained.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use super::Channel;
use crate::error::{Error, Result};

/// How long a read waits for a byte before reporting `WouldBlock`.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// One end of an in-memory duplex channel.
#[derive(Debug)]
pub struct PipeChannel {
    tx: Option<Sender<Vec<u8>>>,
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    poll_interval: Duration,
}

/// Creates a connected pair of channel ends.
pub fn pipe() -> (PipeChannel, PipeChannel) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();

    (PipeChannel::new(a_tx, a_rx), PipeChannel::new(b_tx, b_rx))
}

impl PipeChannel {
    fn new(tx: Sender<Vec<u8>>, rx: Receiver<Vec<u8>>) -> Self {
        Self {
            tx: Some(tx),
            rx,
            pending: VecDeque::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets how long a read waits before reporting `WouldBlock`.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Channel for PipeChannel {
    fn read_byte(&mut self) -> Result<u8> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(byte);
        }

        match self.rx.recv_timeout(self.poll_interval) {
            Ok(chunk) => {
                self.pending.extend(chunk);
                self.pending.pop_front().ok_or(Error::WouldBlock)
            }
            Err(RecvTimeoutError::Timeout) => Err(Error::WouldBlock),
            Err(RecvTimeoutError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let tx = self.tx.as_ref().ok_or(Error::ChannelClosed)?;
        tx.send(buf.to_vec()).map_err(|_| Error::ChannelClosed)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.tx = None;
        Ok(())
    }
}
