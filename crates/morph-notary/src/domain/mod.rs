//! # Domain Layer
//!
//! Script model, request entities and validation rules.
//! No I/O; the chain is reached only through the outbound ports.

pub mod args;
pub mod config;
pub mod entities;
pub mod errors;
pub mod event;
pub mod frame;
pub mod multisig;
pub mod opcode;
pub mod validation;

pub use config::PreparatorConfig;
