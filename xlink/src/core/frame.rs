//! Frame definition and serialization for the link protocol.
//!
//! Frames come in two families: fixed-size supervision frames that carry
//! only a control code, and information frames that carry a stuffed payload
//! followed by its block check.
//!
//! # Frame Format
//!
//! ```text
//! Supervision (SET, UA, DISC, RR, REJ), always 5 bytes:
//! +------+---------+---------+-------+------+
//! | FLAG | Address | Control | BCC1  | FLAG |
//! +------+---------+---------+-------+------+
//!
//! Information:
//! +------+---------+---------+-------+--------------------------+------+
//! | FLAG | Address | Control | BCC1  | stuff(Payload ++ BCC2)   | FLAG |
//! +------+---------+---------+-------+--------------------------+------+
//!
//! BCC1 = Address ^ Control
//! BCC2 = XOR of all payload bytes
//! ```

use super::checksum::Bcc;
use super::stuffing::{self, FLAG};
use crate::MAX_PAYLOAD_SIZE;
use crate::error::{Error, Result};

/// Address carried by commands from the initiator.
pub const ADDRESS_INITIATOR: u8 = 0x03;

/// Address carried by replies from the responder.
pub const ADDRESS_RESPONDER: u8 = 0x01;

/// Size of every supervision frame.
pub const SUPERVISION_FRAME_SIZE: usize = 5;

/// Smallest byte run between flags that can hold a header.
pub const MIN_FRAME_SIZE: usize = 5;

const CONTROL_SET: u8 = 0x03;
const CONTROL_UA: u8 = 0x07;
const CONTROL_DISC: u8 = 0x0B;
const CONTROL_INFO_0: u8 = 0x00;
const CONTROL_INFO_1: u8 = 0x40;
const CONTROL_RR_0: u8 = 0x05;
const CONTROL_RR_1: u8 = 0x85;
const CONTROL_REJ_0: u8 = 0x01;
const CONTROL_REJ_1: u8 = 0x81;

/// One-bit sequence number of the stop-and-wait protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seq {
    /// Sequence bit 0.
    #[default]
    Zero,
    /// Sequence bit 1.
    One,
}

impl Seq {
    /// Returns the other sequence number.
    pub const fn toggled(self) -> Self {
        match self {
            Seq::Zero => Seq::One,
            Seq::One => Seq::Zero,
        }
    }

    /// Returns the sequence number as 0 or 1.
    pub const fn bit(self) -> u8 {
        match self {
            Seq::Zero => 0,
            Seq::One => 1,
        }
    }
}

/// Control field of a frame.
///
/// `Rr(n)` and `Rej(n)` both name the sequence number the receiver accepts
/// next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Connection setup request.
    Set,
    /// Unnumbered acknowledgment.
    Ua,
    /// Disconnect.
    Disc,
    /// Information frame with its sequence number.
    Info(Seq),
    /// Receiver ready, expecting `n`.
    Rr(Seq),
    /// Reject, retransmission of `n` requested.
    Rej(Seq),
}

impl Control {
    /// Converts the control field to its wire byte.
    pub const fn to_u8(self) -> u8 {
        match self {
            Control::Set => CONTROL_SET,
            Control::Ua => CONTROL_UA,
            Control::Disc => CONTROL_DISC,
            Control::Info(Seq::Zero) => CONTROL_INFO_0,
            Control::Info(Seq::One) => CONTROL_INFO_1,
            Control::Rr(Seq::Zero) => CONTROL_RR_0,
            Control::Rr(Seq::One) => CONTROL_RR_1,
            Control::Rej(Seq::Zero) => CONTROL_REJ_0,
            Control::Rej(Seq::One) => CONTROL_REJ_1,
        }
    }

    /// Converts a wire byte to a control field.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            CONTROL_SET => Some(Control::Set),
            CONTROL_UA => Some(Control::Ua),
            CONTROL_DISC => Some(Control::Disc),
            CONTROL_INFO_0 => Some(Control::Info(Seq::Zero)),
            CONTROL_INFO_1 => Some(Control::Info(Seq::One)),
            CONTROL_RR_0 => Some(Control::Rr(Seq::Zero)),
            CONTROL_RR_1 => Some(Control::Rr(Seq::One)),
            CONTROL_REJ_0 => Some(Control::Rej(Seq::Zero)),
            CONTROL_REJ_1 => Some(Control::Rej(Seq::One)),
            _ => None,
        }
    }

    /// Returns true if frames with this control carry a payload.
    pub const fn is_information(&self) -> bool {
        matches!(self, Control::Info(_))
    }
}

/// A decoded frame.
///
/// Information payloads borrow the caller's destuffing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Payload-less control frame.
    Supervision {
        /// Address field.
        address: u8,
        /// Control field.
        control: Control,
    },
    /// Frame carrying application data.
    Information {
        /// Address field.
        address: u8,
        /// Sequence number from the control field.
        seq: Seq,
        /// Destuffed payload without its block check.
        payload: &'a [u8],
    },
}

impl<'a> Frame<'a> {
    /// Builds the five bytes of a supervision frame.
    pub const fn supervision(address: u8, control: Control) -> [u8; SUPERVISION_FRAME_SIZE] {
        let control = control.to_u8();
        [FLAG, address, control, Bcc::header(address, control), FLAG]
    }

    /// Serializes an information frame into the provided buffer.
    ///
    /// Returns the number of bytes written.
    pub fn encode_information(
        address: u8,
        seq: Seq,
        payload: &[u8],
        buf: &mut [u8],
    ) -> Result<usize> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge);
        }
        if buf.len() < MIN_FRAME_SIZE + 1 {
            return Err(Error::BufferTooSmall);
        }

        let control = Control::Info(seq).to_u8();
        buf[0] = FLAG;
        buf[1] = address;
        buf[2] = control;
        buf[3] = Bcc::header(address, control);

        // Leave room for the closing flag
        let end = buf.len() - 1;
        let mut pos = 4;
        pos += stuffing::stuff(payload, &mut buf[pos..end])?;
        pos += stuffing::stuff(&[Bcc::compute(payload)], &mut buf[pos..end])?;
        buf[pos] = FLAG;

        Ok(pos + 1)
    }

    /// Parses a frame captured between two flags, flags included.
    ///
    /// Checks run in wire order: length, header check, control code, then
    /// for information frames the destuffed payload check.
    pub fn decode(raw: &[u8], scratch: &'a mut [u8]) -> Result<Self> {
        if raw.len() < MIN_FRAME_SIZE {
            return Err(Error::FrameTooShort);
        }
        if raw[0] != FLAG || raw[raw.len() - 1] != FLAG {
            return Err(Error::InvalidFrame);
        }

        let address = raw[1];
        if raw[3] != Bcc::header(address, raw[2]) {
            return Err(Error::HeaderChecksum);
        }
        let control = Control::from_u8(raw[2]).ok_or(Error::UnknownControl(raw[2]))?;

        let seq = match control {
            Control::Info(seq) => seq,
            control => {
                if raw.len() != SUPERVISION_FRAME_SIZE {
                    return Err(Error::InvalidFrame);
                }
                return Ok(Frame::Supervision { address, control });
            }
        };

        let body = &raw[4..raw.len() - 1];
        let len = stuffing::destuff(body, scratch)?;
        if len == 0 {
            // No room for the payload check
            return Err(Error::FrameTooShort);
        }

        let data: &'a [u8] = scratch;
        let (payload, check) = data[..len].split_at(len - 1);
        if !Bcc::verify(payload, check[0]) {
            return Err(Error::PayloadChecksum);
        }

        Ok(Frame::Information {
            address,
            seq,
            payload,
        })
    }

    /// Returns the address field.
    pub fn address(&self) -> u8 {
        match self {
            Frame::Supervision { address, .. } | Frame::Information { address, .. } => *address,
        }
    }

    /// Returns the control field.
    pub fn control(&self) -> Control {
        match self {
            Frame::Supervision { control, .. } => *control,
            Frame::Information { seq, .. } => Control::Info(*seq),
        }
    }
}
