//! # Adapters Module
//!
//! In-memory implementations of the outbound ports, for nodes that keep
//! their own view of the committee and chain height.

pub mod memory;

pub use memory::{SharedAlphabet, SharedBlockCounter, StaticAlphabet};
