//! # Morph Notary Request Preparator
//!
//! Validates notary requests received by an Alphabet (committee) node of the
//! side chain and reconstructs the contract call each one carries.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Script model, entities, validation rules, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Adapters Layer** (`adapters/`): In-memory committee and chain height sources
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//! - **Events** (`events/`): Per-contract parsers over prepared events
//!
//! ## Request Layout
//!
//! A notary request pairs a main transaction with a fallback transaction.
//! The main transaction is signed by the proxy contract, the Alphabet
//! multisignature account, an optional invoker and the Notary contract, in
//! that order. The node co-signs only after it has re-derived the call from
//! the raw script.
//!
//! ## Skip Signals
//!
//! `NotaryError::TxAlreadyHandled` and `NotaryError::MainTxExpired` are
//! normal outcomes; check `NotaryError::is_skip` before logging a failure.

pub mod adapters;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

/// Test utilities (committees, request builder)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export public API
pub use domain::config::PreparatorConfig;
pub use domain::entities::{
    Attribute, AttributeType, NotaryRequest, PublicKey, ScriptHash, Signer, Transaction, Witness,
    WitnessScope,
};
pub use domain::errors::{
    ArgumentError, ConfigError, DecodeError, ErrorClass, KeyError, MultisigError, NotaryError,
};
pub use domain::event::{NotaryEvent, NotaryType};
pub use domain::opcode::{Op, OpCode};
pub use domain::validation::DUMMY_INVOCATION_SCRIPT;
pub use ports::inbound::NotaryPreparatorApi;
pub use ports::outbound::{AccessorError, AlphabetKeysSource, BlockCounter};
pub use service::{NotaryPreparator, PreparatorBuilder};
