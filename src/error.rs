//! Error types for the dungeon core.
//!
//! Gameplay outcomes (blocked movement, stairs, falls) are never errors; these
//! cover the things that genuinely fail: bad generation input, missing assets,
//! sockets and config files.

use std::io;
use thiserror::Error;

/// Map generation failed; no partially-shaped node is ever returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("map size {size} is invalid (minimum {min})")]
    InvalidSize { size: i64, min: usize },

    #[error("derived {array} array is {actual_width}x{actual_height}, layout is {expected}x{expected}")]
    ShapeMismatch {
        array: &'static str,
        expected: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("seed {seed} produced a level with no walkable floor")]
    NoFloor { seed: u64 },

    #[error("cell ({x}, {y}) is outside a {size}x{size} map")]
    OutOfBounds { x: i32, y: i32, size: usize },
}

/// Asset lookups and loading. Never fatal to the simulation.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no asset registered under '{0}'")]
    Missing(String),

    #[error("failed to read asset '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode sound '{name}': {reason}")]
    Decode { name: String, reason: String },

    #[error("no audio output device: {0}")]
    Device(String),
}

/// Socket-level failures during session establishment or play.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept a peer: {0}")]
    Accept(#[source] io::Error),

    #[error("timed out after {0}s waiting for the peer")]
    Timeout(u64),

    #[error("peer speaks protocol {theirs}, we speak {ours}")]
    VersionMismatch { ours: u16, theirs: u16 },

    #[error("unexpected message during handshake")]
    Handshake,

    #[error("frame of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("connection closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Anything that can stop a session from starting or continuing.
///
/// Level problems and socket problems stay distinct variants so a caller can
/// never mistake one for the other.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("level generation failed: {0}")]
    Level(#[from] GenerationError),

    #[error("network failure: {0}")]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_keeps_level_and_network_apart() {
        let level: SessionError = GenerationError::NoFloor { seed: 7 }.into();
        let net: SessionError = NetworkError::Closed.into();
        assert!(matches!(level, SessionError::Level(_)));
        assert!(matches!(net, SessionError::Network(_)));
    }

    #[test]
    fn test_invalid_size_message() {
        let err = GenerationError::InvalidSize { size: 0, min: 7 };
        assert_eq!(err.to_string(), "map size 0 is invalid (minimum 7)");
    }
}
