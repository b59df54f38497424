use core::fmt;

/// Protocol phase in which the retry ceiling was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// SET/UA handshake.
    Establish,
    /// Information frame transfer.
    Transfer,
    /// DISC/DISC/UA handshake.
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Establish => write!(f, "establishment"),
            Phase::Transfer => write!(f, "transfer"),
            Phase::Teardown => write!(f, "teardown"),
        }
    }
}

/// Errors produced by the link layer and its channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The channel has no byte available yet.
    WouldBlock,
    /// The channel could not be opened.
    ChannelOpen,
    /// The peer end of the channel is gone.
    ChannelClosed,
    /// The channel reported a device error.
    Io,
    /// The channel accepted zero bytes.
    WriteZero,
    /// Every allowed attempt was used without an answer.
    RetryLimitExceeded(Phase),
    /// Fewer bytes between the flags than a frame header needs.
    FrameTooShort,
    /// Header block check does not equal address XOR control.
    HeaderChecksum,
    /// Payload block check does not match the payload.
    PayloadChecksum,
    /// Escape byte not followed by a valid escape code.
    InvalidEscape,
    /// Control byte is not a known frame type.
    UnknownControl(u8),
    /// Frame structure is malformed.
    InvalidFrame,
    /// Payload exceeds `MAX_PAYLOAD_SIZE`.
    PayloadTooLarge,
    /// Destination buffer is too small.
    BufferTooSmall,
    /// Operation not allowed in the current connection state.
    InvalidState,
    /// Configuration values are out of range.
    InvalidConfig,
}

impl Error {
    /// Returns true for errors that mean the received frame was damaged.
    ///
    /// The receiver answers these with REJ instead of surfacing them.
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::FrameTooShort
                | Error::HeaderChecksum
                | Error::PayloadChecksum
                | Error::InvalidEscape
                | Error::UnknownControl(_)
                | Error::InvalidFrame
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WouldBlock => write!(f, "No data available"),
            Error::ChannelOpen => write!(f, "Failed to open channel"),
            Error::ChannelClosed => write!(f, "Channel closed by peer"),
            Error::Io => write!(f, "Channel I/O error"),
            Error::WriteZero => write!(f, "Write zero bytes"),
            Error::RetryLimitExceeded(phase) => {
                write!(f, "Retry limit exceeded during {}", phase)
            }
            Error::FrameTooShort => write!(f, "Frame too short"),
            Error::HeaderChecksum => write!(f, "Header checksum mismatch"),
            Error::PayloadChecksum => write!(f, "Payload checksum mismatch"),
            Error::InvalidEscape => write!(f, "Invalid escape sequence"),
            Error::UnknownControl(c) => write!(f, "Unknown control byte 0x{:02X}", c),
            Error::InvalidFrame => write!(f, "Invalid frame"),
            Error::PayloadTooLarge => write!(f, "Payload too large"),
            Error::BufferTooSmall => write!(f, "Buffer too small"),
            Error::InvalidState => write!(f, "Invalid connection state"),
            Error::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        let kind = match err {
            Error::WouldBlock => std::io::ErrorKind::WouldBlock,
            Error::WriteZero => std::io::ErrorKind::WriteZero,
            Error::ChannelClosed => std::io::ErrorKind::BrokenPipe,
            Error::RetryLimitExceeded(_) => std::io::ErrorKind::TimedOut,
            Error::ChannelOpen => std::io::ErrorKind::NotFound,
            Error::PayloadTooLarge | Error::BufferTooSmall | Error::InvalidConfig => {
                std::io::ErrorKind::InvalidInput
            }
            e if e.is_corruption() => std::io::ErrorKind::InvalidData,
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
