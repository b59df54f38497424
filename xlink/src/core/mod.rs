//! Core data structures for the link protocol.
//!
//! This module contains fundamental building blocks:
//! - Stuffing: Escaping of reserved bytes inside frame bodies
//! - Checksum: XOR block checks for header and payload
//! - Frame: Wire-level protocol unit, encode and decode
//! - Scanner: Byte-at-a-time frame recognisers

mod checksum;
mod frame;
mod scanner;
pub mod stuffing;

pub use checksum::Bcc;
pub use frame::{
    ADDRESS_INITIATOR, ADDRESS_RESPONDER, Control, Frame, MIN_FRAME_SIZE, SUPERVISION_FRAME_SIZE,
    Seq,
};
pub use scanner::{FrameReader, ScanAction, ScanState, SupervisionScanner, transition};
pub use stuffing::{ESCAPE, FLAG};
