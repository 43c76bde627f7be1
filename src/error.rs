//! The one place errors propagate out of this crate: configuration
//! loading and the transport boundary. The protocol engines themselves
//! never return `Result`; stale/duplicate messages and over-size
//! payloads are handled locally by dropping them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaxosError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode/decode wire message: {0}")]
    Codec(String),

    #[error("value of size {size} exceeds MAX_VALUE_SIZE of {max}")]
    ValueTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, PaxosError>;
