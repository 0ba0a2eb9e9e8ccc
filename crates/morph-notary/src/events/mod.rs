//! # Contract Events
//!
//! Per-contract parsers turning a `NotaryEvent` into a typed operation.
//! They interpret the argument instructions according to the method's
//! known signature; the preparator itself never does.

pub mod subnet;

use crate::domain::errors::ArgumentError;
use thiserror::Error;

/// Errors from per-contract event parsers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("wrong number of parameters: expected {expected}, has {got}")]
    WrongNumberOfParameters { expected: usize, got: usize },

    #[error("{name} param: {source}")]
    Param {
        name: &'static str,
        #[source]
        source: ArgumentError,
    },
}

/// Fail unless exactly `expected` parameters were passed.
pub fn expect_params(expected: usize, got: usize) -> Result<(), ParseError> {
    if expected != got {
        return Err(ParseError::WrongNumberOfParameters { expected, got });
    }
    Ok(())
}
