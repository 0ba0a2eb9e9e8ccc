//! In-memory chain state adapters
//!
//! `SharedAlphabet` and `SharedBlockCounter` are cheap handles: clone one,
//! give the clone to the preparator, and update the original from the
//! block listener.

use crate::domain::entities::PublicKey;
use crate::ports::outbound::{AccessorError, AlphabetKeysSource, BlockCounter};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Fixed committee, e.g. for a private network.
#[derive(Clone, Debug)]
pub struct StaticAlphabet {
    keys: Vec<PublicKey>,
}

impl StaticAlphabet {
    pub fn new(keys: Vec<PublicKey>) -> Self {
        Self { keys }
    }
}

impl AlphabetKeysSource for StaticAlphabet {
    fn alphabet_keys(&self) -> Result<Vec<PublicKey>, AccessorError> {
        Ok(self.keys.clone())
    }
}

/// Committee snapshot replaced on every membership change.
///
/// Reads fail with `Unavailable` until the first snapshot is stored.
#[derive(Clone, Debug, Default)]
pub struct SharedAlphabet {
    keys: Arc<RwLock<Option<Vec<PublicKey>>>>,
}

impl SharedAlphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle already holding `keys`.
    pub fn with_keys(keys: Vec<PublicKey>) -> Self {
        let shared = Self::new();
        shared.replace(keys);
        shared
    }

    /// Store a new committee, returning the previous one.
    pub fn replace(&self, keys: Vec<PublicKey>) -> Option<Vec<PublicKey>> {
        debug!(size = keys.len(), "alphabet snapshot replaced");
        self.keys.write().replace(keys)
    }
}

impl AlphabetKeysSource for SharedAlphabet {
    fn alphabet_keys(&self) -> Result<Vec<PublicKey>, AccessorError> {
        self.keys
            .read()
            .clone()
            .ok_or_else(|| AccessorError::Unavailable("alphabet keys not received yet".into()))
    }
}

/// Chain height fed by the block listener.
#[derive(Clone, Debug, Default)]
pub struct SharedBlockCounter {
    height: Arc<AtomicU32>,
}

impl SharedBlockCounter {
    pub fn new(height: u32) -> Self {
        Self {
            height: Arc::new(AtomicU32::new(height)),
        }
    }

    pub fn set(&self, height: u32) {
        self.height.store(height, Ordering::Release);
    }

    /// Raise the height to `height`; never moves it backwards.
    pub fn advance(&self, height: u32) -> u32 {
        self.height.fetch_max(height, Ordering::AcqRel).max(height)
    }

    pub fn get(&self) -> u32 {
        self.height.load(Ordering::Acquire)
    }
}

impl BlockCounter for SharedBlockCounter {
    fn block_count(&self) -> Result<u32, AccessorError> {
        Ok(self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::committee;

    #[test]
    fn test_static_alphabet() {
        let keys = committee(4);
        let source = StaticAlphabet::new(keys.clone());
        assert_eq!(source.alphabet_keys().unwrap(), keys);
    }

    /// Test: empty shared snapshot reports unavailable
    #[test]
    fn test_shared_alphabet_unset() {
        let source = SharedAlphabet::new();
        assert!(matches!(
            source.alphabet_keys(),
            Err(AccessorError::Unavailable(_))
        ));
    }

    /// Test: updates through one handle are seen by clones
    #[test]
    fn test_shared_alphabet_replace() {
        let source = SharedAlphabet::with_keys(committee(4));
        let reader = source.clone();

        let previous = source.replace(committee(7));
        assert_eq!(previous.map(|k| k.len()), Some(4));
        assert_eq!(reader.alphabet_keys().unwrap().len(), 7);
    }

    #[test]
    fn test_block_counter_advance() {
        let counter = SharedBlockCounter::new(10);
        let reader = counter.clone();

        assert_eq!(counter.advance(15), 15);
        assert_eq!(counter.advance(12), 15);
        assert_eq!(reader.block_count().unwrap(), 15);

        counter.set(3);
        assert_eq!(reader.block_count().unwrap(), 3);
    }

    #[test]
    fn test_adapters_are_shareable_across_threads() {
        let counter = SharedBlockCounter::new(0);
        let handles: Vec<_> = (1..=8)
            .map(|h| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    counter.advance(h * 10);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.get(), 80);
    }
}
