//! # Inbound Ports (Driving Ports / API)
//!
//! Trait that defines the public API of the preparator.

use crate::domain::entities::NotaryRequest;
use crate::domain::errors::NotaryError;
use crate::domain::event::NotaryEvent;
use std::sync::Arc;

/// Notary request preparation API.
///
/// Implementations must be thread-safe (`Send + Sync`) and keep no state
/// between calls: the same request always yields the same outcome against
/// the same committee and chain height.
pub trait NotaryPreparatorApi: Send + Sync {
    /// Validate a raw notary request and reconstruct the contract call it
    /// carries.
    ///
    /// # Errors
    /// * `NotaryError::TxAlreadyHandled` - Alphabet slot is already signed (skip)
    /// * `NotaryError::MainTxExpired` - fallback is already valid (skip)
    /// * any other variant - the request is malformed and must be dropped
    fn prepare(&self, request: Arc<NotaryRequest>) -> Result<NotaryEvent, NotaryError>;
}
