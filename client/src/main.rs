use log::info;
use std::env;
use std::time::Instant;
use xlink::{LinkConfig, MAX_PAYLOAD_SIZE, Role};

const DATA_SIZE: usize = 64 * 1024; // 64 KB
const DEFAULT_PORT: &str = "/dev/ttyS0";
const DEFAULT_BAUD: u32 = 38400;

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let port = args.next().unwrap_or_else(|| DEFAULT_PORT.to_string());
    let baud = args
        .next()
        .map(|b| b.parse().expect("Baud rate must be a number"))
        .unwrap_or(DEFAULT_BAUD);

    info!("Connecting over {} at {} baud...", port, baud);
    let config = LinkConfig::new(Role::Initiator);
    let mut session = xlink::serial::open(&port, baud, config).expect("Failed to establish link");
    info!("Connected!");

    info!("Sending {} KB of data...", DATA_SIZE / 1024);
    let data: Vec<u8> = (0..DATA_SIZE).map(|i| (i % 251) as u8).collect();

    let start = Instant::now();
    let mut sent = 0;
    for chunk in data.chunks(MAX_PAYLOAD_SIZE) {
        sent += session.send(chunk).expect("Failed to send frame");
    }
    let elapsed = start.elapsed();
    let speed = (sent as f64 / 1024.0) / elapsed.as_secs_f64();

    info!("=== Send Complete ===");
    info!("Total sent: {} KB", sent / 1024);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!("Speed: {:.2} KB/s", speed);

    let stats = *session.stats();
    info!(
        "Frames: {}, retransmissions: {} ({:.1}%), rejects: {}, timeouts: {}",
        stats.frames_acknowledged,
        stats.retransmissions,
        stats.retransmit_rate(),
        stats.rejects_received,
        stats.timeouts
    );

    session.close().expect("Failed to close link");
    info!("Disconnected");
}
