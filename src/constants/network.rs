//! Session networking constants.

/// Bumped whenever the frame layout changes
pub const PROTOCOL_VERSION: u16 = 2;
/// Default port for hosting
pub const DEFAULT_PORT: u16 = 7777;
/// Longest address the connect dialog accepts ("255.255.255.255")
pub const MAX_ADDRESS_CHARS: usize = 15;
/// Largest frame accepted from a peer
pub const MAX_FRAME_BYTES: usize = 1200;
/// Seconds to wait for a peer before giving up
pub const HANDSHAKE_TIMEOUT_SECS: u64 = 30;
/// Outgoing messages buffered for the peer writer before snapshots are dropped
pub const PEER_SEND_QUEUE: usize = 64;
