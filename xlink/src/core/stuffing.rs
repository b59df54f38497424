//! Byte stuffing for the information frame body.
//!
//! The flag byte must never appear between the opening and closing flags of
//! a frame. Inside the body, the flag and the escape byte itself are each
//! replaced by a two-byte escape sequence:
//!
//! ```text
//! 0x7E  ->  0x7D 0x5E
//! 0x7D  ->  0x7D 0x5D
//! ```
//!
//! The header is never stuffed.

use crate::error::{Error, Result};

/// Frame delimiter.
pub const FLAG: u8 = 0x7E;

/// Escape marker.
pub const ESCAPE: u8 = 0x7D;

/// Second byte of an escaped flag.
pub const ESCAPED_FLAG: u8 = 0x5E;

/// Second byte of an escaped escape marker.
pub const ESCAPED_ESCAPE: u8 = 0x5D;

/// Upper bound of the stuffed size of `len` bytes.
pub const fn stuffed_len_bound(len: usize) -> usize {
    len * 2
}

/// Stuffs `src` into `dst`.
///
/// Returns the number of bytes written.
pub fn stuff(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let mut written = 0;

    for &byte in src {
        let escaped = match byte {
            FLAG => Some(ESCAPED_FLAG),
            ESCAPE => Some(ESCAPED_ESCAPE),
            _ => None,
        };

        match escaped {
            Some(code) => {
                if written + 2 > dst.len() {
                    return Err(Error::BufferTooSmall);
                }
                dst[written] = ESCAPE;
                dst[written + 1] = code;
                written += 2;
            }
            None => {
                if written >= dst.len() {
                    return Err(Error::BufferTooSmall);
                }
                dst[written] = byte;
                written += 1;
            }
        }
    }

    Ok(written)
}

/// Reverses [`stuff`], writing the original bytes into `dst`.
///
/// An escape marker must be followed by one of the two escape codes;
/// anything else, including a trailing marker, is `Error::InvalidEscape`.
pub fn destuff(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let mut written = 0;
    let mut bytes = src.iter().copied();

    while let Some(byte) = bytes.next() {
        let original = if byte == ESCAPE {
            match bytes.next() {
                Some(ESCAPED_FLAG) => FLAG,
                Some(ESCAPED_ESCAPE) => ESCAPE,
                _ => return Err(Error::InvalidEscape),
            }
        } else {
            byte
        };

        if written >= dst.len() {
            return Err(Error::BufferTooSmall);
        }
        dst[written] = original;
        written += 1;
    }

    Ok(written)
}
