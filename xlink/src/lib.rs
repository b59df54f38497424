//! # XLink - A Stop-and-Wait Data Link Protocol
//!
//! XLink is a `no_std` compatible point-to-point data link protocol for raw
//! byte channels (typically a serial line) that provides:
//!
//! - **Framing**: Flag-delimited frames with byte stuffing
//! - **Error detection**: XOR block checks over the header and the payload
//! - **Connection handshakes**: SET/UA establishment and DISC/DISC/UA teardown
//! - **Reliable delivery**: Stop-and-wait ARQ with RR/REJ acknowledgments
//! - **Custom channel support**: Works with any byte channel implementing [`Channel`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! │            open / send / receive / close                 │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Protocol Layer                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────┐   │
//! │  │  Handshake  │ │  ARQ Engine │ │ Timer / Retries │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────┘   │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Frame Layer                           │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────┐   │
//! │  │  Stuffing   │ │  BCC Check  │ │    Scanners     │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────┘   │
//! ├─────────────────────────────────────────────────────────┤
//! │                    Channel Layer                         │
//! │  ┌─────────────────────────────────────────────────┐   │
//! │  │        Serial port / pipe / custom Channel       │   │
//! │  └─────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use xlink::{LinkConfig, Role, Session, SystemClock};
//!
//! let config = LinkConfig::new(Role::Initiator).with_timeout_ms(1000);
//! let mut session = Session::open(channel, SystemClock::new(), config)?;
//!
//! // Send data
//! session.send(b"Hello, World!")?;
//!
//! // Tear the link down
//! session.close()?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod reliable;

#[cfg(feature = "serial")]
pub mod serial;

// Re-export commonly used types
pub use channel::Channel;
pub use config::{LinkConfig, Role};
pub use self::core::{Bcc, Control, Frame, Seq, SupervisionScanner};
pub use error::{Error, Phase, Result};
pub use protocol::{ConnectionState, Delivery, Session};
pub use reliable::{Clock, LinkStats, StepClock};

#[cfg(feature = "std")]
pub use reliable::SystemClock;

/// Maximum payload carried by one information frame.
pub const MAX_PAYLOAD_SIZE: usize = 1000;

/// Worst-case size of an information frame: every payload byte and the
/// payload checksum stuffed to two bytes, plus flags and header.
pub const MAX_FRAME_SIZE: usize = 2 * (MAX_PAYLOAD_SIZE + 1) + 5;

/// Default per-attempt timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Default maximum transmission attempts per frame
pub const DEFAULT_MAX_RETRIES: u8 = 3;
