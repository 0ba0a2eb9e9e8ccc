//! Preparator configuration and validation
//!
//! # Example
//!
//! ```
//! use morph_notary::domain::PreparatorConfig;
//!
//! let config = PreparatorConfig::default()
//!     .with_legacy_dummy_invocation(false)
//!     .with_max_committee_size(21);
//! assert!(config.validate().is_ok());
//! ```

use crate::domain::errors::ConfigError;
use crate::domain::multisig::MAX_MULTISIG_KEYS;
use serde::{Deserialize, Serialize};

/// Notary preparator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreparatorConfig {
    /// Treat the 66-byte dummy invocation script as an unsigned slot, like
    /// the empty one. Older client APIs fill unsigned slots with it.
    pub accept_legacy_dummy_invocation: bool,
    /// Accept a lone `NEWARRAY0` as the argument list of a zero-argument
    /// call, which is what the chain's script builder emits.
    pub allow_newarray0_arguments: bool,
    /// Largest committee a multisignature account is built for.
    pub max_committee_size: usize,
}

impl Default for PreparatorConfig {
    fn default() -> Self {
        Self {
            accept_legacy_dummy_invocation: true,
            allow_newarray0_arguments: true,
            max_committee_size: MAX_MULTISIG_KEYS,
        }
    }
}

impl PreparatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_committee_size == 0 || self.max_committee_size > MAX_MULTISIG_KEYS {
            return Err(ConfigError::Invalid(format!(
                "max_committee_size must be between 1 and {MAX_MULTISIG_KEYS}, got {}",
                self.max_committee_size
            )));
        }
        Ok(())
    }

    pub fn with_legacy_dummy_invocation(mut self, accept: bool) -> Self {
        self.accept_legacy_dummy_invocation = accept;
        self
    }

    pub fn with_newarray0_arguments(mut self, allow: bool) -> Self {
        self.allow_newarray0_arguments = allow;
        self
    }

    pub fn with_max_committee_size(mut self, size: usize) -> Self {
        self.max_committee_size = size;
        self
    }
}
