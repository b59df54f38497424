//! Byte-level frame recognisers.
//!
//! - [`SupervisionScanner`]: a DFA that recognises one of a set of expected
//!   supervision frames from a given address, used by the handshakes and by
//!   the sender while it waits for RR/REJ.
//! - [`FrameReader`]: collects any flag-delimited frame for the receiver.
//!
//! ```text
//!            FLAG          addr          ctrl ∈ set     addr^ctrl      FLAG
//!  Start ─────────▶ FlagRcv ─────▶ AddrRcv ─────────▶ CtrlRcv ─────────▶ BccOk ─────▶ match
//!    ▲                 ▲  any other byte: back to Start, FLAG: back to FlagRcv  │
//!    └─────────────────┴───────────────────────────────────────────────────────┘
//! ```

use super::frame::Control;
use super::stuffing::FLAG;
use crate::MAX_FRAME_SIZE;

/// Maximum number of controls a scanner can wait for at once.
const MAX_ACCEPTED: usize = 4;

/// DFA state of a [`SupervisionScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Waiting for an opening flag.
    Start,
    /// Opening flag seen.
    FlagRcv,
    /// Expected address seen.
    AddrRcv,
    /// Accepted control seen.
    CtrlRcv(u8),
    /// Header check matched, waiting for the closing flag.
    BccOk(u8),
}

/// What the caller should do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    /// Keep feeding bytes.
    Continue,
    /// A complete frame with this control byte was recognised.
    Matched(u8),
}

/// Pure transition function of the supervision frame DFA.
pub fn transition(state: ScanState, byte: u8, address: u8, accepted: &[u8]) -> (ScanState, ScanAction) {
    let next = match state {
        ScanState::Start if byte == FLAG => ScanState::FlagRcv,
        ScanState::Start => ScanState::Start,
        ScanState::FlagRcv if byte == address => ScanState::AddrRcv,
        ScanState::AddrRcv if accepted.contains(&byte) => ScanState::CtrlRcv(byte),
        ScanState::CtrlRcv(control) if byte == address ^ control => ScanState::BccOk(control),
        ScanState::BccOk(control) if byte == FLAG => {
            return (ScanState::Start, ScanAction::Matched(control));
        }
        ScanState::BccOk(_) => ScanState::Start,
        _ if byte == FLAG => ScanState::FlagRcv,
        _ => ScanState::Start,
    };

    (next, ScanAction::Continue)
}

/// Recognises supervision frames from one address with one of a set of
/// control codes.
#[derive(Debug, Clone)]
pub struct SupervisionScanner {
    address: u8,
    accepted: heapless::Vec<u8, MAX_ACCEPTED>,
    state: ScanState,
}

impl SupervisionScanner {
    /// Creates a scanner for frames from `address` carrying any of `controls`.
    ///
    /// Controls beyond the fourth are ignored.
    pub fn new(address: u8, controls: &[Control]) -> Self {
        let mut accepted = heapless::Vec::new();
        for control in controls.iter().take(MAX_ACCEPTED) {
            let _ = accepted.push(control.to_u8());
        }

        Self {
            address,
            accepted,
            state: ScanState::Start,
        }
    }

    /// Creates a scanner for a single control code.
    pub fn expecting(address: u8, control: Control) -> Self {
        Self::new(address, &[control])
    }

    /// Returns the current DFA state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Feeds one byte, returning the control of a completed frame.
    pub fn feed(&mut self, byte: u8) -> Option<Control> {
        let (next, action) = transition(self.state, byte, self.address, &self.accepted);
        self.state = next;

        match action {
            ScanAction::Matched(control) => Control::from_u8(control),
            ScanAction::Continue => None,
        }
    }

    /// Returns the scanner to its start state.
    pub fn reset(&mut self) {
        self.state = ScanState::Start;
    }
}

/// Collects the bytes of one flag-delimited frame, flags included.
///
/// A flag right after the opening flag is taken as a new opening flag, so
/// an empty frame never ends the scan. A frame that outgrows
/// `MAX_FRAME_SIZE` is dropped and the reader waits for the next flag.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: heapless::Vec<u8, MAX_FRAME_SIZE>,
    in_frame: bool,
    overflows: u32,
}

impl FrameReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte. Returns true when a complete frame is available
    /// through [`FrameReader::frame`].
    pub fn push(&mut self, byte: u8) -> bool {
        if byte == FLAG {
            if !self.in_frame || self.buf.len() == 1 {
                self.buf.clear();
                let _ = self.buf.push(byte);
                self.in_frame = true;
                return false;
            }

            if self.buf.push(byte).is_err() {
                self.drop_frame();
                return false;
            }
            self.in_frame = false;
            return true;
        }

        if self.in_frame && self.buf.push(byte).is_err() {
            self.drop_frame();
        }
        false
    }

    /// Returns the completed frame.
    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    /// Discards any partial or completed frame.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.in_frame = false;
    }

    /// Number of frames dropped for exceeding `MAX_FRAME_SIZE`.
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    fn drop_frame(&mut self) {
        log::warn!("Frame exceeds {} bytes, dropping", MAX_FRAME_SIZE);
        self.overflows += 1;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::{ADDRESS_INITIATOR, ADDRESS_RESPONDER, Frame};
    use crate::core::Seq;

    fn scan(scanner: &mut SupervisionScanner, bytes: &[u8]) -> Option<Control> {
        bytes.iter().find_map(|&b| scanner.feed(b))
    }

    #[test]
    fn test_transition_table() {
        let accepted = [0x07];
        let steps = [
            (ScanState::Start, 0x00, ScanState::Start),
            (ScanState::Start, FLAG, ScanState::FlagRcv),
            (ScanState::FlagRcv, FLAG, ScanState::FlagRcv),
            (ScanState::FlagRcv, 0x01, ScanState::AddrRcv),
            (ScanState::FlagRcv, 0x02, ScanState::Start),
            (ScanState::AddrRcv, 0x07, ScanState::CtrlRcv(0x07)),
            (ScanState::AddrRcv, FLAG, ScanState::FlagRcv),
            (ScanState::AddrRcv, 0x03, ScanState::Start),
            (ScanState::CtrlRcv(0x07), 0x06, ScanState::BccOk(0x07)),
            (ScanState::CtrlRcv(0x07), FLAG, ScanState::FlagRcv),
            (ScanState::CtrlRcv(0x07), 0x05, ScanState::Start),
            (ScanState::BccOk(0x07), 0x00, ScanState::Start),
        ];

        for (from, byte, to) in steps {
            let (next, action) = transition(from, byte, 0x01, &accepted);
            assert_eq!(next, to, "from {:?} on 0x{:02X}", from, byte);
            assert_eq!(action, ScanAction::Continue);
        }

        let (next, action) = transition(ScanState::BccOk(0x07), FLAG, 0x01, &accepted);
        assert_eq!(next, ScanState::Start);
        assert_eq!(action, ScanAction::Matched(0x07));
    }

    #[test]
    fn test_recognises_ua() {
        let mut scanner = SupervisionScanner::expecting(ADDRESS_RESPONDER, Control::Ua);
        let ua = Frame::supervision(ADDRESS_RESPONDER, Control::Ua);
        assert_eq!(scan(&mut scanner, &ua), Some(Control::Ua));
    }

    #[test]
    fn test_skips_noise_and_resyncs_on_flag() {
        let mut scanner = SupervisionScanner::expecting(ADDRESS_INITIATOR, Control::Set);
        // Garbage, a truncated frame, then the real SET
        let bytes = [0x11, 0x22, 0x7E, 0x03, 0x7E, 0x03, 0x03, 0x00, 0x7E];
        assert_eq!(scan(&mut scanner, &bytes), Some(Control::Set));
    }

    #[test]
    fn test_ignores_other_controls_and_bad_checks() {
        let mut scanner = SupervisionScanner::expecting(ADDRESS_RESPONDER, Control::Disc);
        let ua = Frame::supervision(ADDRESS_RESPONDER, Control::Ua);
        let bad_check = [0x7E, 0x01, 0x0B, 0x0B, 0x7E];
        let wrong_addr = Frame::supervision(ADDRESS_INITIATOR, Control::Disc);
        assert_eq!(scan(&mut scanner, &ua), None);
        assert_eq!(scan(&mut scanner, &bad_check), None);
        assert_eq!(scan(&mut scanner, &wrong_addr), None);

        let disc = Frame::supervision(ADDRESS_RESPONDER, Control::Disc);
        assert_eq!(scan(&mut scanner, &disc), Some(Control::Disc));
    }

    #[test]
    fn test_multiple_controls() {
        let mut scanner = SupervisionScanner::new(
            ADDRESS_RESPONDER,
            &[Control::Rr(Seq::One), Control::Rej(Seq::Zero), Control::Rej(Seq::One)],
        );
        let rr0 = Frame::supervision(ADDRESS_RESPONDER, Control::Rr(Seq::Zero));
        let rej0 = Frame::supervision(ADDRESS_RESPONDER, Control::Rej(Seq::Zero));
        let rr1 = Frame::supervision(ADDRESS_RESPONDER, Control::Rr(Seq::One));

        assert_eq!(scan(&mut scanner, &rr0), None);
        assert_eq!(scan(&mut scanner, &rej0), Some(Control::Rej(Seq::Zero)));
        assert_eq!(scan(&mut scanner, &rr1), Some(Control::Rr(Seq::One)));
    }

    #[test]
    fn test_reader_collects_frame() {
        let mut reader = FrameReader::new();
        let bytes = [0x55, 0x7E, 0x03, 0x00, 0x03, 0xAA, 0xAA, 0x7E];
        let complete: heapless::Vec<bool, 8> = bytes.iter().map(|&b| reader.push(b)).collect();
        assert_eq!(complete.iter().filter(|&&c| c).count(), 1);
        assert!(complete[7]);
        assert_eq!(reader.frame(), &bytes[1..]);
    }

    #[test]
    fn test_reader_resyncs_on_back_to_back_flags() {
        let mut reader = FrameReader::new();
        for &b in &[0x7E, 0x7E, 0x7E] {
            assert!(!reader.push(b));
        }
        for &b in &[0x01, 0x07, 0x06] {
            assert!(!reader.push(b));
        }
        assert!(reader.push(0x7E));
        assert_eq!(reader.frame(), &[0x7E, 0x01, 0x07, 0x06, 0x7E]);
    }

    #[test]
    fn test_reader_drops_oversized_frame() {
        let mut reader = FrameReader::new();
        reader.push(FLAG);
        for _ in 0..MAX_FRAME_SIZE {
            assert!(!reader.push(0x11));
        }
        assert_eq!(reader.overflows(), 1);

        // Out of frame now: the next flag opens a fresh frame
        for &b in &[0x7E, 0x01, 0x07, 0x06] {
            assert!(!reader.push(b));
        }
        assert!(reader.push(0x7E));
        assert_eq!(reader.frame().len(), 5);
    }
}
