use log::{info, warn};
use std::env;
use std::time::Instant;
use xlink::{Delivery, LinkConfig, MAX_PAYLOAD_SIZE, Role};

const DEFAULT_PORT: &str = "/dev/ttyS1";
const DEFAULT_BAUD: u32 = 38400;

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let port = args.next().unwrap_or_else(|| DEFAULT_PORT.to_string());
    let baud = args
        .next()
        .map(|b| b.parse().expect("Baud rate must be a number"))
        .unwrap_or(DEFAULT_BAUD);

    info!("Waiting for a link on {} at {} baud...", port, baud);
    let config = LinkConfig::new(Role::Responder);
    let mut session = xlink::serial::open(&port, baud, config).expect("Failed to establish link");
    info!("Client connected!");

    let mut buf = [0u8; MAX_PAYLOAD_SIZE];
    let mut received = 0usize;
    let start = Instant::now();

    loop {
        match session.receive(&mut buf).expect("Failed to receive frame") {
            Delivery::Data(n) => received += n,
            Delivery::Duplicate => {}
            Delivery::Rejected => warn!("Damaged frame rejected"),
            Delivery::Disconnect => break,
        }
    }

    let elapsed = start.elapsed();
    let speed = (received as f64 / 1024.0) / elapsed.as_secs_f64();

    info!("=== Receive Complete ===");
    info!("Total received: {} KB", received / 1024);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!("Speed: {:.2} KB/s", speed);

    let stats = *session.stats();
    info!(
        "Frames: {}, duplicates: {}, rejects sent: {}",
        stats.frames_delivered, stats.duplicates, stats.rejects_sent
    );

    session.close().expect("Failed to close link");
    info!("Disconnected");
}
