use crate::error::{Error, Result};
use crate::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};

/// Which end of the link this endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends SET and DISC, transmits information frames.
    Initiator,
    /// Answers SET and DISC, receives information frames.
    Responder,
}

/// Link parameters shared by the handshakes and the ARQ engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Endpoint role.
    pub role: Role,

    /// Transmissions allowed per frame before giving up. Shared by open,
    /// send and close.
    pub max_retries: u8,

    /// Per-attempt acknowledgment deadline in milliseconds.
    pub timeout_ms: u64,

    /// How long the responder waits for the final UA. `None` means twice
    /// `timeout_ms`.
    pub close_timeout_ms: Option<u64>,
}

impl LinkConfig {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            close_timeout_ms: None,
        }
    }

    pub fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn with_close_timeout_ms(mut self, ms: u64) -> Self {
        self.close_timeout_ms = Some(ms);
        self
    }

    /// Responder's wait for the final UA.
    pub fn close_timeout(&self) -> u64 {
        self.close_timeout_ms
            .unwrap_or_else(|| self.timeout_ms.saturating_mul(2))
    }

    /// Checks that at least one attempt with a non-zero deadline is allowed.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 || self.timeout_ms == 0 || self.close_timeout() == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}
