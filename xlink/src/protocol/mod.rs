//! Session state machine and main API.
//!
//! This module provides the `Session` struct that owns the channel and
//! orchestrates the handshakes and the ARQ engine:
//!
//! - [`Session::open`]: SET/UA establishment
//! - [`Session::send`] / [`Session::receive`]: stop-and-wait transfer
//! - [`Session::close`]: DISC/DISC/UA teardown

mod arq;
mod handshake;

use crate::MAX_FRAME_SIZE;
use crate::channel::Channel;
use crate::config::{LinkConfig, Role};
use crate::core::{Control, Frame, FrameReader, SUPERVISION_FRAME_SIZE, Seq, SupervisionScanner};
use crate::error::{Error, Phase, Result};
use crate::reliable::{Clock, Deadline, LinkStats, RetryTimer};

/// Session connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake done, data may flow.
    Established,

    /// The peer sent DISC; only `close` is allowed.
    PeerClosing,

    /// Teardown ran and the channel was released.
    Closed,
}

/// Outcome of one [`Session::receive`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A new in-sequence frame; its payload length in the caller's buffer.
    Data(usize),

    /// A retransmitted frame that was already delivered. No new data.
    Duplicate,

    /// A damaged frame was answered with REJ. No new data.
    Rejected,

    /// The peer started teardown. Call [`Session::close`] next.
    Disconnect,
}

impl Delivery {
    /// Returns the payload length for `Data`, `None` otherwise.
    pub fn data_len(&self) -> Option<usize> {
        match self {
            Delivery::Data(len) => Some(*len),
            _ => None,
        }
    }
}

/// A live link over one channel.
///
/// The session exclusively owns its channel and clock. Sequence bits are
/// kept per direction: `send_seq` for outgoing information frames and
/// `recv_seq` for the next frame the receiver accepts.
pub struct Session<C, K> {
    channel: C,
    clock: K,
    config: LinkConfig,
    state: ConnectionState,
    send_seq: Seq,
    recv_seq: Seq,
    tx_buf: [u8; MAX_FRAME_SIZE],
    scratch: [u8; MAX_FRAME_SIZE],
    reader: FrameReader,
    stats: LinkStats,
}

impl<C: Channel, K: Clock> Session<C, K> {
    fn new(channel: C, clock: K, config: LinkConfig) -> Self {
        Self {
            channel,
            clock,
            config,
            state: ConnectionState::Established,
            send_seq: Seq::Zero,
            recv_seq: Seq::Zero,
            tx_buf: [0; MAX_FRAME_SIZE],
            scratch: [0; MAX_FRAME_SIZE],
            reader: FrameReader::new(),
            stats: LinkStats::new(),
        }
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if data may still flow.
    pub fn is_established(&self) -> bool {
        self.state == ConnectionState::Established
    }

    /// Get link statistics.
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Get configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Sequence bit of the next information frame to send.
    pub fn send_seq(&self) -> Seq {
        self.send_seq
    }

    /// Sequence bit the receiver accepts next.
    pub fn recv_seq(&self) -> Seq {
        self.recv_seq
    }

    /// Borrow the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Mutably borrow the underlying channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consume the session and return the channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Fails with `InvalidState` unless the session is established and
    /// plays `role`.
    fn require(&self, role: Role) -> Result<()> {
        if self.state != ConnectionState::Established || self.config.role != role {
            return Err(Error::InvalidState);
        }
        Ok(())
    }

    /// Reads one byte. `Ok(None)` means nothing yet.
    fn poll_byte(&mut self) -> Result<Option<u8>> {
        match self.channel.read_byte() {
            Ok(byte) => Ok(Some(byte)),
            Err(Error::WouldBlock) => Ok(None),
            Err(e) => {
                log::error!("Channel failure: {}", e);
                Err(e)
            }
        }
    }

    fn write_supervision(&mut self, address: u8, control: Control) -> Result<()> {
        let frame = Frame::supervision(address, control);
        self.channel.write_all(&frame)?;
        self.stats.frames_sent += 1;
        log::trace!("Sent {:?} from 0x{:02X}", control, address);
        Ok(())
    }

    /// Polls until `scanner` matches. Returns `None` once `deadline`
    /// passes; without a deadline waits indefinitely.
    fn await_supervision(
        &mut self,
        scanner: &mut SupervisionScanner,
        deadline: Option<Deadline>,
    ) -> Result<Option<Control>> {
        loop {
            if let Some(deadline) = deadline {
                if deadline.is_expired(&mut self.clock) {
                    return Ok(None);
                }
            }

            if let Some(byte) = self.poll_byte()? {
                if let Some(control) = scanner.feed(byte) {
                    log::trace!("Matched {:?}", control);
                    return Ok(Some(control));
                }
            }
        }
    }

    /// Transmits the first `len` bytes of `tx_buf` until `scanner` matches
    /// something other than REJ, at most `max_retries` times.
    ///
    /// A REJ or an expired deadline uses up one attempt.
    fn exchange(
        &mut self,
        len: usize,
        scanner: &mut SupervisionScanner,
        phase: Phase,
    ) -> Result<Control> {
        let mut timer = RetryTimer::new(self.config.max_retries, self.config.timeout_ms);

        while timer.start_attempt() {
            if timer.is_retransmission() {
                self.stats.retransmissions += 1;
                log::warn!(
                    "Retransmitting ({}, attempt {}/{})",
                    phase,
                    timer.attempts(),
                    timer.max_attempts()
                );
            }

            self.channel.write_all(&self.tx_buf[..len])?;
            self.stats.frames_sent += 1;

            scanner.reset();
            let deadline = timer.arm(&mut self.clock);
            match self.await_supervision(scanner, Some(deadline))? {
                Some(Control::Rej(seq)) => {
                    self.stats.rejects_received += 1;
                    log::warn!("Peer rejected frame, expecting {:?}", seq);
                }
                Some(control) => return Ok(control),
                None => {
                    self.stats.timeouts += 1;
                    log::warn!("No answer within {} ms ({})", timer.timeout_ms(), phase);
                }
            }
        }

        log::error!(
            "Retry limit reached after {} attempts during {}",
            timer.attempts(),
            phase
        );
        Err(Error::RetryLimitExceeded(phase))
    }

    /// Loads a supervision frame into `tx_buf` for [`Session::exchange`].
    fn stage_supervision(&mut self, address: u8, control: Control) -> usize {
        let frame = Frame::supervision(address, control);
        self.tx_buf[..SUPERVISION_FRAME_SIZE].copy_from_slice(&frame);
        SUPERVISION_FRAME_SIZE
    }
}
