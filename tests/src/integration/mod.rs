//! # Integration Tests
//!
//! Whole-request flows through the public API of `morph-notary`.

pub mod notary_flows;
