use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_STORE_PATH: &str = "catalog.json";
pub const DEFAULT_WORKERS: usize = 3;
/// Simulated load inside every insert's critical section.
pub const DEFAULT_INSERT_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Ceiling of the single read a request must fit in.
pub const DEFAULT_READ_BUFFER: usize = 4096;

/// Server settings. Every field has a default; see [`ServerConfig::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub store_path: PathBuf,
    pub workers: usize,
    pub insert_delay: Duration,
    pub poll_interval: Duration,
    pub read_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            workers: DEFAULT_WORKERS,
            insert_delay: DEFAULT_INSERT_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }
}
