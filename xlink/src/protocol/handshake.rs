//! Connection establishment and teardown.
//!
//! ```text
//!  Initiator                 Responder
//!     │ ───── SET (0x03) ─────▶ │
//!     │ ◀──── UA  (0x01) ────── │      open
//!     │          ...            │
//!     │ ───── DISC (0x03) ────▶ │
//!     │ ◀──── DISC (0x01) ───── │
//!     │ ───── UA  (0x01) ─────▶ │      close
//! ```

use super::{ConnectionState, Session};
use crate::channel::Channel;
use crate::config::{LinkConfig, Role};
use crate::core::{ADDRESS_INITIATOR, ADDRESS_RESPONDER, Control, SupervisionScanner};
use crate::error::{Error, Phase, Result};
use crate::reliable::{Clock, Deadline};

impl<C: Channel, K: Clock> Session<C, K> {
    /// Establishes the link over `channel`.
    ///
    /// The initiator sends SET and waits for UA, retransmitting up to
    /// `max_retries` times. The responder waits for SET without a deadline
    /// and answers UA. On failure the channel is closed before the error
    /// is returned.
    pub fn open(channel: C, clock: K, config: LinkConfig) -> Result<Self> {
        config.validate()?;

        let mut session = Self::new(channel, clock, config);
        let result = match config.role {
            Role::Initiator => session.establish_initiator(),
            Role::Responder => session.establish_responder(),
        };

        if let Err(e) = result {
            session.state = ConnectionState::Closed;
            let _ = session.channel.close();
            return Err(e);
        }

        log::info!("Link established as {:?}", config.role);
        Ok(session)
    }

    /// Tears the link down and releases the channel.
    ///
    /// The channel is closed whatever the outcome. A responder that never
    /// receives the final UA still closes successfully once the extended
    /// timeout passes.
    pub fn close(&mut self) -> Result<()> {
        if self.state == ConnectionState::Closed {
            return Err(Error::InvalidState);
        }

        let result = match self.config.role {
            Role::Initiator => self.teardown_initiator(),
            Role::Responder => self.teardown_responder(),
        };

        self.state = ConnectionState::Closed;
        let released = self.channel.close();

        match result {
            Ok(()) => {
                log::info!("Link closed");
                released
            }
            Err(e) => {
                log::warn!("Teardown failed: {}", e);
                Err(e)
            }
        }
    }

    fn establish_initiator(&mut self) -> Result<()> {
        let len = self.stage_supervision(ADDRESS_INITIATOR, Control::Set);
        let mut scanner = SupervisionScanner::expecting(ADDRESS_RESPONDER, Control::Ua);
        self.exchange(len, &mut scanner, Phase::Establish)?;
        Ok(())
    }

    fn establish_responder(&mut self) -> Result<()> {
        let mut scanner = SupervisionScanner::expecting(ADDRESS_INITIATOR, Control::Set);
        self.await_supervision(&mut scanner, None)?;
        self.write_supervision(ADDRESS_RESPONDER, Control::Ua)
    }

    fn teardown_initiator(&mut self) -> Result<()> {
        let len = self.stage_supervision(ADDRESS_INITIATOR, Control::Disc);
        let mut scanner = SupervisionScanner::expecting(ADDRESS_RESPONDER, Control::Disc);
        self.exchange(len, &mut scanner, Phase::Teardown)?;

        // The final UA carries the responder's address
        self.write_supervision(ADDRESS_RESPONDER, Control::Ua)
    }

    fn teardown_responder(&mut self) -> Result<()> {
        if self.state != ConnectionState::PeerClosing {
            let mut scanner = SupervisionScanner::expecting(ADDRESS_INITIATOR, Control::Disc);
            self.await_supervision(&mut scanner, None)?;
        }
        self.write_supervision(ADDRESS_RESPONDER, Control::Disc)?;

        let timeout = self.config.close_timeout();
        let deadline = Deadline::after(&mut self.clock, timeout);
        let mut ua = SupervisionScanner::expecting(ADDRESS_RESPONDER, Control::Ua);
        let mut disc = SupervisionScanner::expecting(ADDRESS_INITIATOR, Control::Disc);

        while !deadline.is_expired(&mut self.clock) {
            let Some(byte) = self.poll_byte()? else {
                continue;
            };

            if ua.feed(byte).is_some() {
                log::trace!("Matched final UA");
                return Ok(());
            }

            // Our DISC was lost and the initiator sent its own again
            if disc.feed(byte).is_some() {
                log::debug!("DISC repeated, answering again");
                self.stats.retransmissions += 1;
                self.write_supervision(ADDRESS_RESPONDER, Control::Disc)?;
            }
        }

        self.stats.timeouts += 1;
        log::warn!("No UA within {} ms, closing anyway", timeout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::NullChannel;
    use crate::reliable::StepClock;

    fn initiator() -> LinkConfig {
        LinkConfig::new(Role::Initiator)
            .with_max_retries(3)
            .with_timeout_ms(100)
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let mut channel = NullChannel::new();
        let config = initiator().with_max_retries(0);

        let err = Session::open(&mut channel, StepClock::new(10), config).err();
        assert_eq!(err, Some(Error::InvalidConfig));
        assert_eq!(channel.writes(), 0);
        assert!(!channel.is_closed());
    }

    #[test]
    fn test_open_silent_peer_exhausts_retries() {
        let mut channel = NullChannel::new();

        let err = Session::open(&mut channel, StepClock::new(10), initiator()).err();
        assert_eq!(err, Some(Error::RetryLimitExceeded(Phase::Establish)));
        // One SET per attempt, then the channel is released
        assert_eq!(channel.writes(), 3);
        assert_eq!(channel.bytes_written(), 15);
        assert!(channel.is_closed());
    }
}
