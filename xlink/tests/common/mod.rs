//! Shared helpers for the integration tests.
//!
//! [`ScriptedPeer`] plays the far end of the link: every frame the session
//! writes is recorded in a [`WriteLog`] and handed to a reply function
//! whose output becomes the session's next input.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use xlink::core::{ADDRESS_INITIATOR, ADDRESS_RESPONDER};
use xlink::{Channel, Control, Error, Frame, MAX_FRAME_SIZE, Result, Seq};

pub const SET: [u8; 5] = [0x7E, 0x03, 0x03, 0x00, 0x7E];
pub const UA: [u8; 5] = [0x7E, 0x01, 0x07, 0x06, 0x7E];
pub const DISC_FROM_INITIATOR: [u8; 5] = [0x7E, 0x03, 0x0B, 0x08, 0x7E];
pub const DISC_FROM_RESPONDER: [u8; 5] = [0x7E, 0x01, 0x0B, 0x0A, 0x7E];
pub const RR0: [u8; 5] = [0x7E, 0x01, 0x05, 0x04, 0x7E];
pub const RR1: [u8; 5] = [0x7E, 0x01, 0x85, 0x84, 0x7E];
pub const REJ0: [u8; 5] = [0x7E, 0x01, 0x01, 0x00, 0x7E];
pub const REJ1: [u8; 5] = [0x7E, 0x01, 0x81, 0x80, 0x7E];

/// Frames written by a session, in order.
#[derive(Clone, Default)]
pub struct WriteLog(Rc<RefCell<Vec<Vec<u8>>>>);

impl WriteLog {
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<Vec<u8>> {
        self.0.borrow().last().cloned()
    }

    /// Number of written frames carrying `control`.
    pub fn count(&self, control: Control) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|frame| frame.get(2) == Some(&control.to_u8()))
            .count()
    }

    fn push(&self, frame: &[u8]) {
        self.0.borrow_mut().push(frame.to_vec());
    }
}

/// A channel whose far end is a reply function.
pub struct ScriptedPeer {
    inbox: VecDeque<u8>,
    log: WriteLog,
    reply: Box<dyn FnMut(&[u8]) -> Vec<u8>>,
    closed: Rc<Cell<bool>>,
    fail_when_empty: Option<Error>,
}

impl ScriptedPeer {
    pub fn new(reply: impl FnMut(&[u8]) -> Vec<u8> + 'static) -> Self {
        Self {
            inbox: VecDeque::new(),
            log: WriteLog::default(),
            reply: Box::new(reply),
            closed: Rc::new(Cell::new(false)),
            fail_when_empty: None,
        }
    }

    /// A peer that never answers.
    pub fn silent() -> Self {
        Self::new(|_| Vec::new())
    }

    /// Queues bytes for the session to read.
    pub fn with_input(mut self, bytes: &[u8]) -> Self {
        self.inbox.extend(bytes.iter().copied());
        self
    }

    /// Once the queued bytes run out, reads fail with `error` instead of
    /// reporting `WouldBlock`.
    pub fn fail_when_empty(mut self, error: Error) -> Self {
        self.fail_when_empty = Some(error);
        self
    }

    pub fn log(&self) -> WriteLog {
        self.log.clone()
    }

    pub fn closed(&self) -> Rc<Cell<bool>> {
        self.closed.clone()
    }
}

impl Channel for ScriptedPeer {
    fn read_byte(&mut self) -> Result<u8> {
        if let Some(byte) = self.inbox.pop_front() {
            return Ok(byte);
        }
        Err(self.fail_when_empty.unwrap_or(Error::WouldBlock))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed.get() {
            return Err(Error::ChannelClosed);
        }
        self.log.push(buf);
        let reply = (self.reply)(buf);
        self.inbox.extend(reply);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed.set(true);
        Ok(())
    }
}

/// Answers like a well-behaved responder: UA for SET, RR for every
/// information frame, DISC for DISC.
pub fn ack_all(frame: &[u8]) -> Vec<u8> {
    match Control::from_u8(frame[2]) {
        Some(Control::Set) => UA.to_vec(),
        Some(Control::Info(seq)) => Frame::supervision(ADDRESS_RESPONDER, Control::Rr(seq.toggled())).to_vec(),
        Some(Control::Disc) => DISC_FROM_RESPONDER.to_vec(),
        _ => Vec::new(),
    }
}

/// Encodes an information frame from the initiator.
pub fn information(seq: Seq, payload: &[u8]) -> Vec<u8> {
    let mut buf = [0u8; MAX_FRAME_SIZE];
    let len = Frame::encode_information(ADDRESS_INITIATOR, seq, payload, &mut buf).unwrap();
    buf[..len].to_vec()
}

pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}
