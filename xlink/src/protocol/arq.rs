//! Stop-and-wait ARQ engine.
//!
//! The sender keeps one information frame outstanding and retransmits it
//! on REJ or timeout. The receiver validates each frame, answers with
//! RR or REJ and filters duplicates by sequence bit.

use super::{ConnectionState, Delivery, Session};
use crate::channel::Channel;
use crate::config::Role;
use crate::core::{ADDRESS_INITIATOR, ADDRESS_RESPONDER, Control, Frame, Seq, SupervisionScanner};
use crate::error::{Error, Phase, Result};
use crate::reliable::Clock;

/// What the receiver makes of one complete frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Not for us, or nothing to answer.
    Ignore,
    /// SET again: our UA was lost.
    Setup,
    /// DISC: the peer is tearing down.
    Disconnect,
    /// Damaged frame, answer REJ.
    Corrupt(Error),
    /// Already delivered, answer RR again.
    Duplicate(Seq),
    /// New payload of this length copied out.
    Data(usize),
    /// Payload does not fit the caller's buffer.
    TooSmall,
}

/// Classifies a frame captured between two flags.
fn inspect(raw: &[u8], scratch: &mut [u8], expected: Seq, out: &mut [u8]) -> Verdict {
    let frame = match Frame::decode(raw, scratch) {
        Ok(frame) => frame,
        Err(e) => return Verdict::Corrupt(e),
    };

    if frame.address() != ADDRESS_INITIATOR {
        return Verdict::Ignore;
    }

    match frame {
        Frame::Supervision {
            control: Control::Set,
            ..
        } => Verdict::Setup,
        Frame::Supervision {
            control: Control::Disc,
            ..
        } => Verdict::Disconnect,
        Frame::Supervision { .. } => Verdict::Ignore,
        Frame::Information { seq, .. } if seq != expected => Verdict::Duplicate(seq),
        Frame::Information { payload, .. } => {
            if payload.len() > out.len() {
                return Verdict::TooSmall;
            }
            out[..payload.len()].copy_from_slice(payload);
            Verdict::Data(payload.len())
        }
    }
}

impl<C: Channel, K: Clock> Session<C, K> {
    /// Sends one payload and waits for its acknowledgment.
    ///
    /// Returns the number of payload bytes accepted by the peer. The frame
    /// is retransmitted with the same sequence bit on REJ or timeout; after
    /// `max_retries` transmissions the call fails with
    /// `RetryLimitExceeded(Phase::Transfer)`.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not an established initiator
    /// - `PayloadTooLarge` if `payload` exceeds `MAX_PAYLOAD_SIZE`
    pub fn send(&mut self, payload: &[u8]) -> Result<usize> {
        self.require(Role::Initiator)?;

        let seq = self.send_seq;
        let len = Frame::encode_information(ADDRESS_INITIATOR, seq, payload, &mut self.tx_buf)?;
        log::trace!("Sending I{} ({} payload bytes)", seq.bit(), payload.len());

        let next = seq.toggled();
        let mut scanner = SupervisionScanner::new(
            ADDRESS_RESPONDER,
            &[Control::Rr(next), Control::Rej(Seq::Zero), Control::Rej(Seq::One)],
        );
        self.exchange(len, &mut scanner, Phase::Transfer)?;

        self.send_seq = next;
        self.stats.frames_acknowledged += 1;
        self.stats.bytes_sent += payload.len() as u64;
        log::debug!("I{} acknowledged, next is I{}", seq.bit(), next.bit());

        Ok(payload.len())
    }

    /// Waits for the next frame from the initiator.
    ///
    /// Blocks until a complete frame arrives; only a channel failure ends
    /// the wait early. Damaged frames are answered with REJ and reported as
    /// [`Delivery::Rejected`], duplicates with RR and
    /// [`Delivery::Duplicate`].
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not an established responder
    /// - `BufferTooSmall` if the payload does not fit `out`; the frame is
    ///   left unacknowledged so the retransmission can be received later
    pub fn receive(&mut self, out: &mut [u8]) -> Result<Delivery> {
        self.require(Role::Responder)?;

        loop {
            let Some(byte) = self.poll_byte()? else {
                continue;
            };
            if !self.reader.push(byte) {
                continue;
            }

            let verdict = inspect(self.reader.frame(), &mut self.scratch, self.recv_seq, out);
            self.reader.reset();

            match verdict {
                Verdict::Ignore => {}
                Verdict::Setup => {
                    log::debug!("SET repeated, answering UA again");
                    self.write_supervision(ADDRESS_RESPONDER, Control::Ua)?;
                }
                Verdict::Disconnect => {
                    self.state = ConnectionState::PeerClosing;
                    log::info!("Peer requested disconnect");
                    return Ok(Delivery::Disconnect);
                }
                Verdict::Corrupt(e) => {
                    log::warn!("Rejecting frame ({}), expecting I{}", e, self.recv_seq.bit());
                    self.write_supervision(ADDRESS_RESPONDER, Control::Rej(self.recv_seq))?;
                    self.stats.rejects_sent += 1;
                    return Ok(Delivery::Rejected);
                }
                Verdict::Duplicate(seq) => {
                    log::debug!("Duplicate I{}, acknowledging again", seq.bit());
                    self.write_supervision(ADDRESS_RESPONDER, Control::Rr(self.recv_seq))?;
                    self.stats.duplicates += 1;
                    return Ok(Delivery::Duplicate);
                }
                Verdict::Data(len) => {
                    let next = self.recv_seq.toggled();
                    self.write_supervision(ADDRESS_RESPONDER, Control::Rr(next))?;
                    log::debug!("Delivered I{} ({} bytes)", self.recv_seq.bit(), len);
                    self.recv_seq = next;
                    self.stats.frames_delivered += 1;
                    self.stats.bytes_received += len as u64;
                    return Ok(Delivery::Data(len));
                }
                Verdict::TooSmall => return Err(Error::BufferTooSmall),
            }
        }
    }
}
