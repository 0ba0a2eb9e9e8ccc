//! # Outbound Ports (Driven Ports / SPI)
//!
//! Chain state the preparator depends on. Both accessors are called on
//! every request and may be backed by network calls; implementations must
//! tolerate concurrent reads.

use crate::domain::entities::PublicKey;
use thiserror::Error;

/// Error from a chain state accessor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessorError {
    /// The value is not known yet
    #[error("value unavailable: {0}")]
    Unavailable(String),

    /// Communication error
    #[error("communication error: {0}")]
    Communication(String),
}

/// Source of the current committee (Alphabet) public keys.
///
/// Must return the live committee: membership can change between calls.
pub trait AlphabetKeysSource: Send + Sync {
    fn alphabet_keys(&self) -> Result<Vec<PublicKey>, AccessorError>;
}

/// Current block count of the side chain.
pub trait BlockCounter: Send + Sync {
    fn block_count(&self) -> Result<u32, AccessorError>;
}

impl<F> AlphabetKeysSource for F
where
    F: Fn() -> Result<Vec<PublicKey>, AccessorError> + Send + Sync,
{
    fn alphabet_keys(&self) -> Result<Vec<PublicKey>, AccessorError> {
        self()
    }
}

impl<F> BlockCounter for F
where
    F: Fn() -> Result<u32, AccessorError> + Send + Sync,
{
    fn block_count(&self) -> Result<u32, AccessorError> {
        self()
    }
}
