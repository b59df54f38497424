//! Initiator and responder on two threads over an in-memory pipe.

use std::thread;

use xlink::channel::{self, PipeChannel};
use xlink::{
    Channel, Delivery, LinkConfig, LinkStats, MAX_PAYLOAD_SIZE, Result, Role, Session,
    SystemClock,
};

/// Damages or drops selected frames written through it.
struct Faulty<C> {
    inner: C,
    writes: usize,
    fault: fn(usize, &[u8]) -> Fault,
}

enum Fault {
    Pass,
    Corrupt,
    Drop,
}

impl<C: Channel> Channel for Faulty<C> {
    fn read_byte(&mut self) -> Result<u8> {
        self.inner.read_byte()
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.writes += 1;
        match (self.fault)(self.writes, buf) {
            Fault::Pass => self.inner.write(buf),
            Fault::Corrupt => {
                let mut damaged = buf.to_vec();
                // Header check of an information frame: never a reserved byte
                damaged[3] ^= 0xFF;
                self.inner.write(&damaged)
            }
            Fault::Drop => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

fn faulty(inner: PipeChannel, fault: fn(usize, &[u8]) -> Fault) -> Faulty<PipeChannel> {
    Faulty {
        inner,
        writes: 0,
        fault,
    }
}

fn config(role: Role, timeout_ms: u64) -> LinkConfig {
    LinkConfig::new(role).with_max_retries(5).with_timeout_ms(timeout_ms)
}

fn test_data() -> Vec<u8> {
    (0..4500).map(|i| (i % 256) as u8).collect()
}

fn run<A, B>(
    initiator: A,
    responder: B,
    data: &[u8],
    timeout_ms: u64,
) -> (Vec<u8>, LinkStats, LinkStats)
where
    A: Channel,
    B: Channel + Send + 'static,
{
    let handle = thread::spawn(move || {
        let config = config(Role::Responder, timeout_ms);
        let mut session = Session::open(responder, SystemClock::new(), config).unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; MAX_PAYLOAD_SIZE];

        loop {
            match session.receive(&mut buf).unwrap() {
                Delivery::Data(n) => received.extend_from_slice(&buf[..n]),
                Delivery::Disconnect => break,
                Delivery::Duplicate | Delivery::Rejected => {}
            }
        }
        session.close().unwrap();
        (received, *session.stats())
    });

    let config = config(Role::Initiator, timeout_ms);
    let mut session = Session::open(initiator, SystemClock::new(), config).unwrap();
    for chunk in data.chunks(MAX_PAYLOAD_SIZE) {
        assert_eq!(session.send(chunk).unwrap(), chunk.len());
    }
    session.close().unwrap();
    let sent = *session.stats();

    let (received, recv_stats) = handle.join().unwrap();
    (received, sent, recv_stats)
}

#[test]
fn test_clean_link() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (a, b) = channel::pipe();
    let data = test_data();

    let (received, sent, recv) = run(a, b, &data, 1000);
    assert_eq!(received, data);
    assert_eq!(sent.frames_acknowledged, 5);
    assert_eq!(recv.frames_delivered, 5);
}

#[test]
fn test_corrupted_frames_are_rejected_and_resent() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (a, b) = channel::pipe();
    // Damage the second and fourth information frames on first sight
    let a = faulty(a, |n, frame| {
        if frame.len() > 5 && (n == 3 || n == 6) {
            Fault::Corrupt
        } else {
            Fault::Pass
        }
    });
    let data = test_data();

    let (received, sent, recv) = run(a, b, &data, 1000);
    assert_eq!(received, data);
    assert_eq!(sent.rejects_received, 2);
    assert_eq!(sent.retransmissions, 2);
    assert_eq!(recv.rejects_sent, 2);
    assert_eq!(recv.frames_delivered, 5);
}

#[test]
fn test_lost_acknowledgment_yields_duplicate() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (a, b) = channel::pipe();
    // Writes by the responder: UA, then one RR per frame; lose the second RR
    let b = faulty(b, |n, _| if n == 3 { Fault::Drop } else { Fault::Pass });
    let data = test_data();

    let (received, sent, recv) = run(a, b, &data, 300);
    assert_eq!(received, data);
    assert_eq!(sent.timeouts, 1);
    assert_eq!(recv.duplicates, 1);
    assert_eq!(recv.frames_delivered, 5);
}
